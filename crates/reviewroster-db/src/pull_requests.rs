use crate::error::{DbError, DbResult};
use crate::models::{PullRequestRaw, PullRequestSummaryRaw};
use chrono::{DateTime, Utc};
use reviewroster_core::{PrStatus, PullRequest, PullRequestSummary, UserId, WriteOutcome};
use sqlx::{Any, Pool};

/// Outcome of inserting a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestInsert {
    Created,
    IdTaken,
    /// A reviewer was no longer an active member of the team
    StaleReviewer,
}

/// Insert a pull request and its reviewers in one transaction.
///
/// Reviewer rows are only written for users that are still active members of
/// `team_name`; if any is not, the whole insert is rolled back.
pub async fn insert_pull_request(
    pool: &Pool<Any>,
    pr: &PullRequest,
    team_name: &str,
) -> DbResult<PullRequestInsert> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        "INSERT INTO pull_requests (id, title, author_id, status, created_at, merged_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&pr.pull_request_id)
    .bind(&pr.pull_request_name)
    .bind(&pr.author_id)
    .bind(pr.status.as_str())
    .bind(pr.created_at.to_rfc3339())
    .bind(pr.merged_at.map(|at| at.to_rfc3339()))
    .execute(&mut *tx)
    .await
    .map_err(DbError::from);

    match inserted {
        Ok(_) => {}
        Err(e) if e.is_unique_violation() => return Ok(PullRequestInsert::IdTaken),
        Err(e) => return Err(e),
    }

    for reviewer_id in &pr.assigned_reviewers {
        let result = sqlx::query(
            "INSERT INTO pr_reviewers (pr_id, user_id)
             SELECT ?, id FROM users WHERE id = ? AND is_active = 1 AND team_name = ?",
        )
        .bind(&pr.pull_request_id)
        .bind(reviewer_id)
        .bind(team_name)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() != 1 {
            return Ok(PullRequestInsert::StaleReviewer);
        }
    }

    tx.commit().await?;
    Ok(PullRequestInsert::Created)
}

/// Get a pull request with its reviewer set
pub async fn get_pull_request(pool: &Pool<Any>, pr_id: &str) -> DbResult<Option<PullRequest>> {
    let raw = sqlx::query_as::<_, PullRequestRaw>(
        "SELECT id, title, author_id, status, created_at, merged_at
         FROM pull_requests
         WHERE id = ?",
    )
    .bind(pr_id)
    .fetch_optional(pool)
    .await?;

    let Some(raw) = raw else {
        return Ok(None);
    };

    let reviewers = list_reviewers(pool, pr_id).await?;
    raw.into_pull_request(reviewers).map(Some)
}

/// Reviewers currently assigned to a pull request
pub async fn list_reviewers(pool: &Pool<Any>, pr_id: &str) -> DbResult<Vec<UserId>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT user_id FROM pr_reviewers WHERE pr_id = ? ORDER BY user_id")
            .bind(pr_id)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Update status; `merged_at` is only set the first time the PR is merged.
///
/// Returns false if the pull request does not exist.
pub async fn update_status(
    pool: &Pool<Any>,
    pr_id: &str,
    status: PrStatus,
    at: DateTime<Utc>,
) -> DbResult<bool> {
    let merged_at = (status == PrStatus::Merged).then(|| at.to_rfc3339());

    let result = sqlx::query(
        "UPDATE pull_requests SET status = ?, merged_at = COALESCE(merged_at, ?) WHERE id = ?",
    )
    .bind(status.as_str())
    .bind(merged_at)
    .bind(pr_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Conditionally swap one reviewer for another in a single statement.
///
/// Applies only while the pull request is OPEN, `old_id` is assigned,
/// `new_id` is not, and `new_id` is an active member of `team_name`.
pub async fn swap_reviewer(
    pool: &Pool<Any>,
    pr_id: &str,
    old_id: &str,
    new_id: &str,
    team_name: &str,
) -> DbResult<WriteOutcome> {
    let result = sqlx::query(
        "UPDATE pr_reviewers SET user_id = ?
         WHERE pr_id = ? AND user_id = ?
           AND EXISTS (SELECT 1 FROM pull_requests WHERE id = ? AND status = 'OPEN')
           AND EXISTS (SELECT 1 FROM users WHERE id = ? AND is_active = 1 AND team_name = ?)
           AND NOT EXISTS (SELECT 1 FROM pr_reviewers WHERE pr_id = ? AND user_id = ?)",
    )
    .bind(new_id)
    .bind(pr_id)
    .bind(old_id)
    .bind(pr_id)
    .bind(new_id)
    .bind(team_name)
    .bind(pr_id)
    .bind(new_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 1 {
        Ok(WriteOutcome::Applied)
    } else {
        Ok(WriteOutcome::Stale)
    }
}

/// Pull requests a user is assigned to review
pub async fn list_reviewed_by(
    pool: &Pool<Any>,
    user_id: &str,
) -> DbResult<Vec<PullRequestSummary>> {
    sqlx::query_as::<_, PullRequestSummaryRaw>(
        "SELECT pr.id, pr.title, pr.author_id, pr.status
         FROM pull_requests pr
         JOIN pr_reviewers r ON pr.id = r.pr_id
         WHERE r.user_id = ?
         ORDER BY pr.created_at, pr.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(PullRequestSummary::try_from)
    .collect()
}
