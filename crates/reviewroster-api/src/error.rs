use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reviewroster_core::{ErrorKind, ReviewError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Domain error from the review service
    Review(ReviewError),

    /// Undecodable body or missing query parameter (400)
    BadRequest(String),

    /// Internal server error
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Review(e) => write!(f, "{}", e),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// HTTP status and stable wire code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Review(e) => match e.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ErrorKind::Invalid => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                ErrorKind::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "TIMEOUT"),
                ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
                ErrorKind::Conflict => conflict_code(e),
            },
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

/// Conflicts carry their own code; a duplicate team name is a 400
fn conflict_code(e: &ReviewError) -> (StatusCode, &'static str) {
    match e {
        ReviewError::TeamExists(_) => (StatusCode::BAD_REQUEST, "TEAM_EXISTS"),
        ReviewError::PullRequestExists(_) => (StatusCode::CONFLICT, "PR_EXISTS"),
        ReviewError::Merged(_) => (StatusCode::CONFLICT, "PR_MERGED"),
        ReviewError::NotAssigned { .. } => (StatusCode::CONFLICT, "NOT_ASSIGNED"),
        ReviewError::NoCandidate { .. } => (StatusCode::CONFLICT, "NO_CANDIDATE"),
        _ => (StatusCode::CONFLICT, "CONFLICT"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "internal error".to_string()
        } else {
            match &self {
                ApiError::Review(e) => e.to_string(),
                ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg.clone(),
            }
        };

        let error_response = ErrorResponse {
            status: "ERROR".to_string(),
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<ReviewError> for ApiError {
    fn from(e: ReviewError) -> Self {
        ApiError::Review(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
