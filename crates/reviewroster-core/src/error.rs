use thiserror::Error;

/// Broad class of a [`ReviewError`], used by transports to pick a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Invalid,
    Unavailable,
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The author does not exist or does not belong to any team
    #[error("Author not found or has no team: {0}")]
    AuthorNotFound(String),

    #[error("Pull request not found: {0}")]
    PullRequestNotFound(String),

    #[error("Team already exists: {0}")]
    TeamExists(String),

    #[error("Pull request already exists: {0}")]
    PullRequestExists(String),

    #[error("Cannot reassign on merged pull request: {0}")]
    Merged(String),

    #[error("Reviewer {user_id} is not assigned to pull request {pr_id}")]
    NotAssigned { pr_id: String, user_id: String },

    #[error("No active replacement candidate for {user_id} on pull request {pr_id}")]
    NoCandidate { pr_id: String, user_id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation deadline exceeded")]
    DeadlineExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReviewError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReviewError::TeamNotFound(_)
            | ReviewError::UserNotFound(_)
            | ReviewError::AuthorNotFound(_)
            | ReviewError::PullRequestNotFound(_) => ErrorKind::NotFound,
            ReviewError::TeamExists(_)
            | ReviewError::PullRequestExists(_)
            | ReviewError::Merged(_)
            | ReviewError::NotAssigned { .. }
            | ReviewError::NoCandidate { .. } => ErrorKind::Conflict,
            ReviewError::InvalidInput(_) => ErrorKind::Invalid,
            ReviewError::Cancelled | ReviewError::DeadlineExceeded => ErrorKind::Unavailable,
            ReviewError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type ReviewResult<T> = Result<T, ReviewError>;
