use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use reviewroster_core::{PullRequestSummary, User, UserId};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetIsActiveRequest {
    pub user_id: UserId,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub user_id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewListResponse {
    pub user_id: UserId,
    pub pull_requests: Vec<PullRequestSummary>,
}

/// POST /users/setIsActive
pub async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Json(request) = payload?;
    let user = state
        .scope
        .run(
            state
                .service
                .set_user_active(&request.user_id, request.is_active),
        )
        .await?;

    Ok(Json(UserResponse { user }))
}

/// GET /users/getReview?user_id=
///
/// Unknown users get an empty list.
pub async fn get_review(
    State(state): State<AppState>,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> ApiResult<Json<ReviewListResponse>> {
    let Query(query) = query?;
    let pull_requests = state
        .scope
        .run(state.service.reviews_for(&query.user_id))
        .await?;

    Ok(Json(ReviewListResponse {
        user_id: query.user_id,
        pull_requests,
    }))
}
