use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReviewError;

/// Maximum number of reviewers a pull request can have
pub const MAX_REVIEWERS: usize = 2;

pub type UserId = String;

/// Status of a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrStatus {
    /// Open for review, reviewers can be reassigned
    Open,
    /// Merged (terminal)
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }

    pub fn is_open(&self) -> bool {
        *self == PrStatus::Open
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(ReviewError::Internal(format!(
                "unknown pull request status: {}",
                other
            ))),
        }
    }
}

/// Team member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
}

/// Team with its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<User>,
}

/// Pull request with its current reviewer set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: UserId,
    pub status: PrStatus,
    pub assigned_reviewers: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Create a new open pull request
    pub fn new(
        pull_request_id: String,
        pull_request_name: String,
        author_id: UserId,
        assigned_reviewers: Vec<UserId>,
    ) -> Self {
        Self {
            pull_request_id,
            pull_request_name,
            author_id,
            status: PrStatus::Open,
            assigned_reviewers,
            created_at: Utc::now(),
            merged_at: None,
        }
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|id| id == user_id)
    }

    pub fn summary(&self) -> PullRequestSummary {
        PullRequestSummary {
            pull_request_id: self.pull_request_id.clone(),
            pull_request_name: self.pull_request_name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// Pull request without its reviewer list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: UserId,
    pub status: PrStatus,
}
