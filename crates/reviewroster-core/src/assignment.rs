use tracing::debug;

use crate::error::{ReviewError, ReviewResult};
use crate::model::{MAX_REVIEWERS, UserId};
use crate::selection::CandidatePicker;
use crate::store::ReviewStore;

/// Reviewers chosen for a new pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Team the reviewers were drawn from (the author's team)
    pub team_name: String,
    /// Between zero and [`MAX_REVIEWERS`] distinct user ids
    pub reviewers: Vec<UserId>,
}

/// Selects initial reviewers from the author's team roster
pub struct AssignmentEngine<'a> {
    store: &'a dyn ReviewStore,
    picker: &'a CandidatePicker,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(store: &'a dyn ReviewStore, picker: &'a CandidatePicker) -> Self {
        Self { store, picker }
    }

    /// Choose up to two active teammates of `author_id`.
    ///
    /// An author whose team has no other active member gets an empty
    /// reviewer set rather than an error.
    pub async fn assign(&self, author_id: &str) -> ReviewResult<Assignment> {
        let author = self
            .store
            .find_user(author_id)
            .await?
            .ok_or_else(|| ReviewError::AuthorNotFound(author_id.to_string()))?;

        let team_name = author
            .team_name
            .ok_or_else(|| ReviewError::AuthorNotFound(author_id.to_string()))?;

        let pool = self
            .store
            .list_active_team_members(&team_name, &[author.user_id])
            .await?;

        let reviewers = self.picker.pick(&pool, MAX_REVIEWERS);

        debug!(
            "Picked {} of {} candidates from team {} for author {}",
            reviewers.len(),
            pool.len(),
            team_name,
            author_id
        );

        Ok(Assignment {
            team_name,
            reviewers,
        })
    }
}
