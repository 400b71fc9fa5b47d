pub mod error;
pub mod health;
pub mod pull_requests;
pub mod state;
pub mod teams;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

// Re-export commonly used types
pub use error::{ApiError, ApiResult, ErrorBody, ErrorResponse};
pub use health::{health, init_server_start_time};
pub use state::AppState;

/// Build the HTTP router with all routes and the tracing layer
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/team/add", post(teams::add_team))
        .route("/team/get", get(teams::get_team))
        .route("/users/setIsActive", post(users::set_is_active))
        .route("/users/getReview", get(users::get_review))
        .route("/pullRequest/create", post(pull_requests::create))
        .route("/pullRequest/merge", post(pull_requests::merge))
        .route("/pullRequest/reassign", post(pull_requests::reassign))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
