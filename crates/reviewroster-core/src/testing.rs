use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ReviewResult;
use crate::memory::MemoryStore;
use crate::model::{PrStatus, PullRequest, PullRequestSummary, Team, User, UserId};
use crate::store::{PullRequestStore, RosterStore, WriteOutcome};

/// Store that loses a configurable number of write races.
///
/// Each lost write first deactivates the reviewer the caller picked, as a
/// concurrent `set_user_active` would, then reports `Stale`.
#[derive(Debug, Default)]
pub struct StaleWrites {
    inner: MemoryStore,
    stale_creates: AtomicUsize,
    stale_replacements: AtomicUsize,
    deactivated: Mutex<Vec<UserId>>,
}

impl StaleWrites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lose_creates(&self, n: usize) {
        self.stale_creates.store(n, Ordering::SeqCst);
    }

    pub fn lose_replacements(&self, n: usize) {
        self.stale_replacements.store(n, Ordering::SeqCst);
    }

    /// Users deactivated by lost writes, in order
    pub fn deactivated(&self) -> Vec<UserId> {
        self.deactivated
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn deactivate(&self, user_id: &str) -> ReviewResult<()> {
        self.inner.set_user_active(user_id, false).await?;
        self.deactivated
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(user_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl RosterStore for StaleWrites {
    async fn find_team(&self, name: &str) -> ReviewResult<Option<Team>> {
        self.inner.find_team(name).await
    }

    async fn find_user(&self, user_id: &str) -> ReviewResult<Option<User>> {
        self.inner.find_user(user_id).await
    }

    async fn list_active_team_members(
        &self,
        team_name: &str,
        exclude: &[UserId],
    ) -> ReviewResult<Vec<UserId>> {
        self.inner.list_active_team_members(team_name, exclude).await
    }

    async fn add_team(&self, team: &Team) -> ReviewResult<()> {
        self.inner.add_team(team).await
    }

    async fn set_user_active(
        &self,
        user_id: &str,
        is_active: bool,
    ) -> ReviewResult<Option<User>> {
        self.inner.set_user_active(user_id, is_active).await
    }
}

#[async_trait]
impl PullRequestStore for StaleWrites {
    async fn create_pull_request(
        &self,
        pr: &PullRequest,
        team_name: &str,
    ) -> ReviewResult<WriteOutcome> {
        if Self::take(&self.stale_creates) {
            if let Some(first) = pr.assigned_reviewers.first() {
                self.deactivate(first).await?;
            }
            return Ok(WriteOutcome::Stale);
        }
        self.inner.create_pull_request(pr, team_name).await
    }

    async fn get_pull_request(&self, pr_id: &str) -> ReviewResult<Option<PullRequest>> {
        self.inner.get_pull_request(pr_id).await
    }

    async fn set_pull_request_status(
        &self,
        pr_id: &str,
        status: PrStatus,
        at: DateTime<Utc>,
    ) -> ReviewResult<bool> {
        self.inner.set_pull_request_status(pr_id, status, at).await
    }

    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_id: &str,
        new_id: &str,
        team_name: &str,
    ) -> ReviewResult<WriteOutcome> {
        if Self::take(&self.stale_replacements) {
            self.deactivate(new_id).await?;
            return Ok(WriteOutcome::Stale);
        }
        self.inner
            .replace_reviewer(pr_id, old_id, new_id, team_name)
            .await
    }

    async fn list_reviewers_of(&self, pr_id: &str) -> ReviewResult<Vec<UserId>> {
        self.inner.list_reviewers_of(pr_id).await
    }

    async fn list_pull_requests_reviewed_by(
        &self,
        user_id: &str,
    ) -> ReviewResult<Vec<PullRequestSummary>> {
        self.inner.list_pull_requests_reviewed_by(user_id).await
    }
}
