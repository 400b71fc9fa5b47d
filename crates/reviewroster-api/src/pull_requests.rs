use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use reviewroster_core::{PullRequest, UserId};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct MergePullRequest {
    pub pull_request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReassignReviewer {
    pub pull_request_id: String,
    pub old_user_id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PullRequestResponse {
    pub pr: PullRequest,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReassignResponse {
    pub pr: PullRequest,
    pub replaced_by: UserId,
}

/// POST /pullRequest/create
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PullRequestResponse>)> {
    let Json(request) = payload?;
    let pr = state
        .scope
        .run(state.service.create(
            &request.pull_request_id,
            &request.pull_request_name,
            &request.author_id,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

/// POST /pullRequest/merge
///
/// Merging an already merged pull request returns it unchanged.
pub async fn merge(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequest>, JsonRejection>,
) -> ApiResult<Json<PullRequestResponse>> {
    let Json(request) = payload?;
    let pr = state
        .scope
        .run(state.service.merge(&request.pull_request_id))
        .await?;

    Ok(Json(PullRequestResponse { pr }))
}

/// POST /pullRequest/reassign
pub async fn reassign(
    State(state): State<AppState>,
    payload: Result<Json<ReassignReviewer>, JsonRejection>,
) -> ApiResult<Json<ReassignResponse>> {
    let Json(request) = payload?;
    let outcome = state
        .scope
        .run(
            state
                .service
                .reassign(&request.pull_request_id, &request.old_user_id),
        )
        .await?;

    Ok(Json(ReassignResponse {
        pr: outcome.pull_request,
        replaced_by: outcome.replaced_by,
    }))
}
