use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use reviewroster_core::Team;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamResponse {
    pub team: Team,
}

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team_name: String,
}

/// POST /team/add
///
/// Creates the team and upserts its members, moving existing users into it.
pub async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<Team>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    let Json(team) = payload?;
    let team = state.scope.run(state.service.add_team(team)).await?;

    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// GET /team/get?team_name=
pub async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> ApiResult<Json<Team>> {
    let Query(query) = query?;
    let team = state
        .scope
        .run(state.service.get_team(&query.team_name))
        .await?;

    Ok(Json(team))
}
