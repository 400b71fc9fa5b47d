use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ReviewResult;
use crate::model::{PrStatus, PullRequest, PullRequestSummary, Team, User, UserId};

/// Result of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write was applied
    Applied,
    /// A precondition no longer held, nothing was written
    Stale,
}

/// Read access to teams and users, plus the few roster writes the service needs
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn find_team(&self, name: &str) -> ReviewResult<Option<Team>>;

    async fn find_user(&self, user_id: &str) -> ReviewResult<Option<User>>;

    /// Ids of active members of `team_name`, minus `exclude`
    async fn list_active_team_members(
        &self,
        team_name: &str,
        exclude: &[UserId],
    ) -> ReviewResult<Vec<UserId>>;

    /// Create a team and upsert its members into it.
    ///
    /// Fails with `TeamExists` if the name is taken.
    async fn add_team(&self, team: &Team) -> ReviewResult<()>;

    /// Returns the updated user, or `None` if the id is unknown
    async fn set_user_active(&self, user_id: &str, is_active: bool)
    -> ReviewResult<Option<User>>;
}

/// Durable storage for pull requests and their reviewer relation
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Insert the pull request row and its reviewer rows atomically.
    ///
    /// Each reviewer must still be an active member of `team_name` at write
    /// time, otherwise nothing is written and `Stale` is returned. Fails with
    /// `PullRequestExists` if the id is taken.
    async fn create_pull_request(
        &self,
        pr: &PullRequest,
        team_name: &str,
    ) -> ReviewResult<WriteOutcome>;

    async fn get_pull_request(&self, pr_id: &str) -> ReviewResult<Option<PullRequest>>;

    /// Returns false if the pull request does not exist. `merged_at` is only
    /// set on the first transition to `Merged`.
    async fn set_pull_request_status(
        &self,
        pr_id: &str,
        status: PrStatus,
        at: DateTime<Utc>,
    ) -> ReviewResult<bool>;

    /// Swap `old` for `new` in the reviewer set.
    ///
    /// Applies only if the pull request is open, `old` is assigned, `new` is
    /// not, and `new` is still an active member of `team_name`.
    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_id: &str,
        new_id: &str,
        team_name: &str,
    ) -> ReviewResult<WriteOutcome>;

    async fn list_reviewers_of(&self, pr_id: &str) -> ReviewResult<Vec<UserId>>;

    async fn list_pull_requests_reviewed_by(
        &self,
        user_id: &str,
    ) -> ReviewResult<Vec<PullRequestSummary>>;
}

/// Everything the review service needs from persistence
pub trait ReviewStore: RosterStore + PullRequestStore {}

impl<T: RosterStore + PullRequestStore + ?Sized> ReviewStore for T {}
