use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use crate::error::{ReviewError, ReviewResult};
use crate::model::{PrStatus, PullRequest, PullRequestSummary, Team, User, UserId};
use crate::store::{PullRequestStore, RosterStore, WriteOutcome};

#[derive(Debug, Default)]
struct State {
    teams: BTreeSet<String>,
    users: BTreeMap<UserId, User>,
    pull_requests: BTreeMap<String, PullRequest>,
}

impl State {
    fn is_active_member(&self, user_id: &str, team_name: &str) -> bool {
        self.users
            .get(user_id)
            .is_some_and(|u| u.is_active && u.team_name.as_deref() == Some(team_name))
    }

    /// True if `username` belongs to a user other than `user_id`
    fn username_taken(&self, username: &str, user_id: &str) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && u.user_id != user_id)
    }
}

/// In-process store backed by ordered maps
///
/// Every write happens under a single lock with no await in between, so each
/// call is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RosterStore for MemoryStore {
    async fn find_team(&self, name: &str) -> ReviewResult<Option<Team>> {
        let state = self.state.read().await;
        if !state.teams.contains(name) {
            return Ok(None);
        }

        let members = state
            .users
            .values()
            .filter(|u| u.team_name.as_deref() == Some(name))
            .cloned()
            .collect();

        Ok(Some(Team {
            team_name: name.to_string(),
            members,
        }))
    }

    async fn find_user(&self, user_id: &str) -> ReviewResult<Option<User>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn list_active_team_members(
        &self,
        team_name: &str,
        exclude: &[UserId],
    ) -> ReviewResult<Vec<UserId>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.is_active && u.team_name.as_deref() == Some(team_name))
            .filter(|u| !exclude.contains(&u.user_id))
            .map(|u| u.user_id.clone())
            .collect())
    }

    async fn add_team(&self, team: &Team) -> ReviewResult<()> {
        let mut state = self.state.write().await;
        if state.teams.contains(&team.team_name) {
            return Err(ReviewError::TeamExists(team.team_name.clone()));
        }

        // Reject before writing anything
        for (i, member) in team.members.iter().enumerate() {
            let taken_before = team.members[..i]
                .iter()
                .any(|m| m.username == member.username && m.user_id != member.user_id);
            if taken_before || state.username_taken(&member.username, &member.user_id) {
                return Err(ReviewError::InvalidInput(format!(
                    "a member username of team {} is already used by another user",
                    team.team_name
                )));
            }
        }

        state.teams.insert(team.team_name.clone());
        for member in &team.members {
            let user = User {
                team_name: Some(
                    member
                        .team_name
                        .clone()
                        .unwrap_or_else(|| team.team_name.clone()),
                ),
                ..member.clone()
            };
            state.users.insert(user.user_id.clone(), user);
        }

        Ok(())
    }

    async fn set_user_active(
        &self,
        user_id: &str,
        is_active: bool,
    ) -> ReviewResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(user_id).map(|user| {
            user.is_active = is_active;
            user.clone()
        }))
    }
}

#[async_trait]
impl PullRequestStore for MemoryStore {
    async fn create_pull_request(
        &self,
        pr: &PullRequest,
        team_name: &str,
    ) -> ReviewResult<WriteOutcome> {
        let mut state = self.state.write().await;
        if state.pull_requests.contains_key(&pr.pull_request_id) {
            return Err(ReviewError::PullRequestExists(pr.pull_request_id.clone()));
        }

        if !pr
            .assigned_reviewers
            .iter()
            .all(|id| state.is_active_member(id, team_name))
        {
            return Ok(WriteOutcome::Stale);
        }

        state
            .pull_requests
            .insert(pr.pull_request_id.clone(), pr.clone());
        Ok(WriteOutcome::Applied)
    }

    async fn get_pull_request(&self, pr_id: &str) -> ReviewResult<Option<PullRequest>> {
        Ok(self.state.read().await.pull_requests.get(pr_id).cloned())
    }

    async fn set_pull_request_status(
        &self,
        pr_id: &str,
        status: PrStatus,
        at: DateTime<Utc>,
    ) -> ReviewResult<bool> {
        let mut state = self.state.write().await;
        let Some(pr) = state.pull_requests.get_mut(pr_id) else {
            return Ok(false);
        };

        if status == PrStatus::Merged && pr.merged_at.is_none() {
            pr.merged_at = Some(at);
        }
        pr.status = status;
        Ok(true)
    }

    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_id: &str,
        new_id: &str,
        team_name: &str,
    ) -> ReviewResult<WriteOutcome> {
        let mut state = self.state.write().await;
        let candidate_ok = state.is_active_member(new_id, team_name);

        let Some(pr) = state.pull_requests.get_mut(pr_id) else {
            return Ok(WriteOutcome::Stale);
        };

        if !pr.status.is_open() || !candidate_ok || pr.has_reviewer(new_id) {
            return Ok(WriteOutcome::Stale);
        }

        match pr.assigned_reviewers.iter_mut().find(|id| id.as_str() == old_id) {
            Some(slot) => {
                *slot = new_id.to_string();
                Ok(WriteOutcome::Applied)
            }
            None => Ok(WriteOutcome::Stale),
        }
    }

    async fn list_reviewers_of(&self, pr_id: &str) -> ReviewResult<Vec<UserId>> {
        Ok(self
            .state
            .read()
            .await
            .pull_requests
            .get(pr_id)
            .map(|pr| pr.assigned_reviewers.clone())
            .unwrap_or_default())
    }

    async fn list_pull_requests_reviewed_by(
        &self,
        user_id: &str,
    ) -> ReviewResult<Vec<PullRequestSummary>> {
        let state = self.state.read().await;
        Ok(state
            .pull_requests
            .values()
            .filter(|pr| pr.has_reviewer(user_id))
            .map(PullRequest::summary)
            .collect())
    }
}
