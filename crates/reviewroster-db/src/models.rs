use chrono::{DateTime, Utc};
use reviewroster_core::{PrStatus, PullRequest, PullRequestSummary, User, UserId};
use sqlx::FromRow;

use crate::error::{DbError, DbResult};

/// Raw user row (SQLite BOOLEAN as INTEGER)
#[derive(Debug, Clone, FromRow)]
pub(crate) struct UserRaw {
    pub id: String,
    pub username: String,
    pub is_active: i64,
    pub team_name: Option<String>,
}

impl From<UserRaw> for User {
    fn from(raw: UserRaw) -> Self {
        Self {
            user_id: raw.id,
            username: raw.username,
            is_active: raw.is_active != 0,
            team_name: raw.team_name,
        }
    }
}

/// Raw pull request row (with string status and timestamps)
#[derive(Debug, Clone, FromRow)]
pub(crate) struct PullRequestRaw {
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub status: String,
    pub created_at: String,
    pub merged_at: Option<String>,
}

impl PullRequestRaw {
    pub fn into_pull_request(self, assigned_reviewers: Vec<UserId>) -> DbResult<PullRequest> {
        Ok(PullRequest {
            status: parse_status(&self.status)?,
            created_at: parse_timestamp(&self.created_at)?,
            merged_at: self.merged_at.as_deref().map(parse_timestamp).transpose()?,
            pull_request_id: self.id,
            pull_request_name: self.title,
            author_id: self.author_id,
            assigned_reviewers,
        })
    }
}

/// Raw pull request row without timestamps
#[derive(Debug, Clone, FromRow)]
pub(crate) struct PullRequestSummaryRaw {
    pub id: String,
    pub title: String,
    pub author_id: String,
    pub status: String,
}

impl TryFrom<PullRequestSummaryRaw> for PullRequestSummary {
    type Error = DbError;

    fn try_from(raw: PullRequestSummaryRaw) -> DbResult<Self> {
        Ok(Self {
            status: parse_status(&raw.status)?,
            pull_request_id: raw.id,
            pull_request_name: raw.title,
            author_id: raw.author_id,
        })
    }
}

fn parse_status(s: &str) -> DbResult<PrStatus> {
    s.parse()
        .map_err(|_| DbError::InvalidStatus(s.to_string()))
}

fn parse_timestamp(s: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DbError::InvalidTimestamp(s.to_string()))
}
