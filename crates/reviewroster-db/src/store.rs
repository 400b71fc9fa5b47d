use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reviewroster_core::{
    PrStatus, PullRequest, PullRequestStore, PullRequestSummary, ReviewError, ReviewResult,
    RosterStore, Team, User, UserId, WriteOutcome,
};
use sqlx::{Any, Pool};
use tracing::debug;

use crate::pull_requests::{self, PullRequestInsert};
use crate::roster::{self, TeamInsert};

/// [`reviewroster_core::ReviewStore`] backed by an `sqlx::Any` pool
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: Pool<Any>,
}

impl SqlStore {
    pub fn new(pool: Pool<Any>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RosterStore for SqlStore {
    async fn find_team(&self, name: &str) -> ReviewResult<Option<Team>> {
        Ok(roster::get_team(&self.pool, name).await?)
    }

    async fn find_user(&self, user_id: &str) -> ReviewResult<Option<User>> {
        Ok(roster::get_user(&self.pool, user_id).await?)
    }

    async fn list_active_team_members(
        &self,
        team_name: &str,
        exclude: &[UserId],
    ) -> ReviewResult<Vec<UserId>> {
        Ok(roster::list_active_members(&self.pool, team_name, exclude).await?)
    }

    async fn add_team(&self, team: &Team) -> ReviewResult<()> {
        match roster::insert_team(&self.pool, team).await? {
            TeamInsert::Created => Ok(()),
            TeamInsert::NameTaken => Err(ReviewError::TeamExists(team.team_name.clone())),
            TeamInsert::UsernameTaken => Err(ReviewError::InvalidInput(format!(
                "a member username of team {} is already used by another user",
                team.team_name
            ))),
        }
    }

    async fn set_user_active(
        &self,
        user_id: &str,
        is_active: bool,
    ) -> ReviewResult<Option<User>> {
        Ok(roster::set_active(&self.pool, user_id, is_active).await?)
    }
}

#[async_trait]
impl PullRequestStore for SqlStore {
    async fn create_pull_request(
        &self,
        pr: &PullRequest,
        team_name: &str,
    ) -> ReviewResult<WriteOutcome> {
        match pull_requests::insert_pull_request(&self.pool, pr, team_name).await? {
            PullRequestInsert::Created => Ok(WriteOutcome::Applied),
            PullRequestInsert::StaleReviewer => {
                debug!("Insert of {} rolled back, reviewer went stale", pr.pull_request_id);
                Ok(WriteOutcome::Stale)
            }
            PullRequestInsert::IdTaken => {
                Err(ReviewError::PullRequestExists(pr.pull_request_id.clone()))
            }
        }
    }

    async fn get_pull_request(&self, pr_id: &str) -> ReviewResult<Option<PullRequest>> {
        Ok(pull_requests::get_pull_request(&self.pool, pr_id).await?)
    }

    async fn set_pull_request_status(
        &self,
        pr_id: &str,
        status: PrStatus,
        at: DateTime<Utc>,
    ) -> ReviewResult<bool> {
        Ok(pull_requests::update_status(&self.pool, pr_id, status, at).await?)
    }

    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_id: &str,
        new_id: &str,
        team_name: &str,
    ) -> ReviewResult<WriteOutcome> {
        Ok(pull_requests::swap_reviewer(&self.pool, pr_id, old_id, new_id, team_name).await?)
    }

    async fn list_reviewers_of(&self, pr_id: &str) -> ReviewResult<Vec<UserId>> {
        Ok(pull_requests::list_reviewers(&self.pool, pr_id).await?)
    }

    async fn list_pull_requests_reviewed_by(
        &self,
        user_id: &str,
    ) -> ReviewResult<Vec<PullRequestSummary>> {
        Ok(pull_requests::list_reviewed_by(&self.pool, user_id).await?)
    }
}
