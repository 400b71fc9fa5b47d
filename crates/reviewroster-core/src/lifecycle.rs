use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::assignment::AssignmentEngine;
use crate::error::{ReviewError, ReviewResult};
use crate::locks::PrLocks;
use crate::model::{PrStatus, PullRequest, PullRequestSummary, Team, User, UserId};
use crate::reassignment::ReassignmentEngine;
use crate::selection::CandidatePicker;
use crate::store::{ReviewStore, WriteOutcome};

/// Attempts at persisting a new pull request when a picked reviewer goes
/// inactive between selection and write
const MAX_CREATE_ATTEMPTS: usize = 3;

/// Result of a successful reassignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    pub replaced_by: UserId,
}

/// Pull request lifecycle manager
///
/// Owns the OPEN → MERGED state machine and the rules the assignment and
/// reassignment engines run under. All mutations of one pull request are
/// serialized through [`PrLocks`].
pub struct ReviewService {
    store: Arc<dyn ReviewStore>,
    picker: Arc<CandidatePicker>,
    locks: PrLocks,
}

impl ReviewService {
    pub fn new(store: Arc<dyn ReviewStore>, picker: Arc<CandidatePicker>) -> Self {
        Self {
            store,
            picker,
            locks: PrLocks::new(),
        }
    }

    /// Open a new pull request and assign up to two reviewers from the
    /// author's team
    pub async fn create(
        &self,
        pr_id: &str,
        title: &str,
        author_id: &str,
    ) -> ReviewResult<PullRequest> {
        require("pull_request_id", pr_id)?;
        require("pull_request_name", title)?;
        require("author_id", author_id)?;

        let _guard = self.locks.acquire(pr_id).await;

        if self.store.get_pull_request(pr_id).await?.is_some() {
            return Err(ReviewError::PullRequestExists(pr_id.to_string()));
        }

        let engine = AssignmentEngine::new(self.store.as_ref(), &self.picker);

        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let assignment = engine.assign(author_id).await?;
            let pr = PullRequest::new(
                pr_id.to_string(),
                title.to_string(),
                author_id.to_string(),
                assignment.reviewers,
            );

            match self
                .store
                .create_pull_request(&pr, &assignment.team_name)
                .await?
            {
                WriteOutcome::Applied => {
                    info!(
                        "Created pull request {} by {} with reviewers {:?}",
                        pr_id, author_id, pr.assigned_reviewers
                    );
                    return Ok(pr);
                }
                WriteOutcome::Stale => {
                    warn!(
                        "Reviewer selection for {} went stale (attempt {}/{}), retrying",
                        pr_id, attempt, MAX_CREATE_ATTEMPTS
                    );
                }
            }
        }

        Err(ReviewError::Internal(format!(
            "could not persist a consistent reviewer set for {}",
            pr_id
        )))
    }

    /// Mark a pull request merged.
    ///
    /// Merging an already merged pull request succeeds and changes nothing.
    pub async fn merge(&self, pr_id: &str) -> ReviewResult<PullRequest> {
        require("pull_request_id", pr_id)?;

        let _guard = self.locks.acquire(pr_id).await;

        let pr = self.load(pr_id).await?;
        if pr.status == PrStatus::Merged {
            info!("Pull request {} already merged, nothing to do", pr_id);
            return Ok(pr);
        }

        if !self
            .store
            .set_pull_request_status(pr_id, PrStatus::Merged, Utc::now())
            .await?
        {
            return Err(ReviewError::PullRequestNotFound(pr_id.to_string()));
        }

        info!("Merged pull request {}", pr_id);
        self.load(pr_id).await
    }

    /// Replace `old_reviewer_id` on an open pull request
    pub async fn reassign(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
    ) -> ReviewResult<Reassignment> {
        require("pull_request_id", pr_id)?;
        require("old_user_id", old_reviewer_id)?;

        let _guard = self.locks.acquire(pr_id).await;

        let engine = ReassignmentEngine::new(self.store.as_ref(), &self.picker);
        let replaced_by = engine.reassign(pr_id, old_reviewer_id).await?;

        info!(
            "Reassigned reviewer on {}: {} -> {}",
            pr_id, old_reviewer_id, replaced_by
        );

        Ok(Reassignment {
            pull_request: self.load(pr_id).await?,
            replaced_by,
        })
    }

    /// Current view of a pull request including its reviewers
    pub async fn get(&self, pr_id: &str) -> ReviewResult<PullRequest> {
        require("pull_request_id", pr_id)?;
        self.load(pr_id).await
    }

    pub async fn add_team(&self, team: Team) -> ReviewResult<Team> {
        require("team_name", &team.team_name)?;
        for member in &team.members {
            require("user_id", &member.user_id)?;
            require("username", &member.username)?;
        }

        self.store.add_team(&team).await?;
        info!(
            "Added team {} with {} members",
            team.team_name,
            team.members.len()
        );

        self.get_team(&team.team_name).await
    }

    pub async fn get_team(&self, team_name: &str) -> ReviewResult<Team> {
        require("team_name", team_name)?;
        self.store
            .find_team(team_name)
            .await?
            .ok_or_else(|| ReviewError::TeamNotFound(team_name.to_string()))
    }

    /// Toggle a user's availability for future assignments.
    ///
    /// Existing assignments are left as they are.
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> ReviewResult<User> {
        require("user_id", user_id)?;
        let user = self
            .store
            .set_user_active(user_id, is_active)
            .await?
            .ok_or_else(|| ReviewError::UserNotFound(user_id.to_string()))?;

        info!("Set is_active={} for user {}", is_active, user_id);
        Ok(user)
    }

    /// Pull requests `user_id` is assigned to review
    pub async fn reviews_for(&self, user_id: &str) -> ReviewResult<Vec<PullRequestSummary>> {
        require("user_id", user_id)?;
        self.store.list_pull_requests_reviewed_by(user_id).await
    }

    async fn load(&self, pr_id: &str) -> ReviewResult<PullRequest> {
        self.store
            .get_pull_request(pr_id)
            .await?
            .ok_or_else(|| ReviewError::PullRequestNotFound(pr_id.to_string()))
    }
}

fn require(field: &str, value: &str) -> ReviewResult<()> {
    if value.trim().is_empty() {
        return Err(ReviewError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}
