use tracing::{debug, warn};

use crate::error::{ReviewError, ReviewResult};
use crate::model::{PrStatus, UserId};
use crate::selection::CandidatePicker;
use crate::store::{ReviewStore, WriteOutcome};

/// Attempts before giving up when candidates keep going stale under us
const MAX_ATTEMPTS: usize = 3;

/// Replaces one reviewer of an open pull request with a peer from the
/// departing reviewer's own team
pub struct ReassignmentEngine<'a> {
    store: &'a dyn ReviewStore,
    picker: &'a CandidatePicker,
}

impl<'a> ReassignmentEngine<'a> {
    pub fn new(store: &'a dyn ReviewStore, picker: &'a CandidatePicker) -> Self {
        Self { store, picker }
    }

    /// Swap `old_reviewer_id` out of `pr_id` and return the replacement id.
    ///
    /// Preconditions are checked in order: the pull request exists, it is
    /// open, and `old_reviewer_id` is currently assigned. The replacement is
    /// drawn from active members of the old reviewer's team who are neither
    /// the author nor already reviewing.
    pub async fn reassign(&self, pr_id: &str, old_reviewer_id: &str) -> ReviewResult<UserId> {
        for attempt in 1..=MAX_ATTEMPTS {
            let pr = self
                .store
                .get_pull_request(pr_id)
                .await?
                .ok_or_else(|| ReviewError::PullRequestNotFound(pr_id.to_string()))?;

            if pr.status == PrStatus::Merged {
                return Err(ReviewError::Merged(pr_id.to_string()));
            }

            if !pr.has_reviewer(old_reviewer_id) {
                return Err(ReviewError::NotAssigned {
                    pr_id: pr_id.to_string(),
                    user_id: old_reviewer_id.to_string(),
                });
            }

            let old_reviewer = self
                .store
                .find_user(old_reviewer_id)
                .await?
                .ok_or_else(|| ReviewError::UserNotFound(old_reviewer_id.to_string()))?;

            let no_candidate = || ReviewError::NoCandidate {
                pr_id: pr_id.to_string(),
                user_id: old_reviewer_id.to_string(),
            };

            let Some(team_name) = old_reviewer.team_name else {
                return Err(no_candidate());
            };

            let mut exclude = pr.assigned_reviewers.clone();
            exclude.push(pr.author_id.clone());

            let pool = self
                .store
                .list_active_team_members(&team_name, &exclude)
                .await?;

            let new_reviewer_id = self.picker.pick_one(&pool).ok_or_else(no_candidate)?;

            debug!(
                "Replacing {} with {} on {} (pool of {} from team {})",
                old_reviewer_id,
                new_reviewer_id,
                pr_id,
                pool.len(),
                team_name
            );

            match self
                .store
                .replace_reviewer(pr_id, old_reviewer_id, &new_reviewer_id, &team_name)
                .await?
            {
                WriteOutcome::Applied => return Ok(new_reviewer_id),
                WriteOutcome::Stale => {
                    warn!(
                        "Reassignment of {} on {} went stale (attempt {}/{}), retrying",
                        old_reviewer_id, pr_id, attempt, MAX_ATTEMPTS
                    );
                }
            }
        }

        Err(ReviewError::NoCandidate {
            pr_id: pr_id.to_string(),
            user_id: old_reviewer_id.to_string(),
        })
    }
}
