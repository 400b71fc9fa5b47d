use crate::error::DbResult;
use crate::models::UserRaw;
use reviewroster_core::{Team, User, UserId};
use sqlx::{Any, Pool};

/// Outcome of inserting a team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamInsert {
    Created,
    NameTaken,
    /// A member's username belongs to a different user id
    UsernameTaken,
}

/// Insert a team and upsert its members in one transaction
pub async fn insert_team(pool: &Pool<Any>, team: &Team) -> DbResult<TeamInsert> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query("INSERT INTO teams (name) VALUES (?)")
        .bind(&team.team_name)
        .execute(&mut *tx)
        .await;

    match inserted {
        Ok(_) => {}
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Ok(TeamInsert::NameTaken);
        }
        Err(e) => return Err(e.into()),
    }

    for member in &team.members {
        let team_name = member.team_name.as_deref().unwrap_or(&team.team_name);
        let is_active: i64 = if member.is_active { 1 } else { 0 };

        let result = sqlx::query(
            "INSERT INTO users (id, username, is_active, team_name) VALUES (?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET username = excluded.username, is_active = excluded.is_active, team_name = excluded.team_name",
        )
        .bind(&member.user_id)
        .bind(&member.username)
        .bind(is_active)
        .bind(team_name)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Ok(TeamInsert::UsernameTaken);
            }
            Err(e) => return Err(e.into()),
        }
    }

    tx.commit().await?;
    Ok(TeamInsert::Created)
}

/// Get a team with its current members
pub async fn get_team(pool: &Pool<Any>, name: &str) -> DbResult<Option<Team>> {
    let existing: Option<(String,)> = sqlx::query_as("SELECT name FROM teams WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if existing.is_none() {
        return Ok(None);
    }

    let members = sqlx::query_as::<_, UserRaw>(
        "SELECT id, username, is_active, team_name FROM users WHERE team_name = ? ORDER BY id",
    )
    .bind(name)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|raw| raw.into())
    .collect();

    Ok(Some(Team {
        team_name: name.to_string(),
        members,
    }))
}

/// Get user by ID
pub async fn get_user(pool: &Pool<Any>, user_id: &str) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, UserRaw>(
        "SELECT id, username, is_active, team_name FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .map(|raw| raw.into());

    Ok(user)
}

/// Ids of active members of a team, excluding `exclude`
pub async fn list_active_members(
    pool: &Pool<Any>,
    team_name: &str,
    exclude: &[UserId],
) -> DbResult<Vec<UserId>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM users WHERE team_name = ? AND is_active = 1 ORDER BY id")
            .bind(team_name)
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id,)| id)
        .filter(|id| !exclude.contains(id))
        .collect())
}

/// Set user activity flag; `None` if the user does not exist
pub async fn set_active(pool: &Pool<Any>, user_id: &str, is_active: bool) -> DbResult<Option<User>> {
    let is_active_int: i64 = if is_active { 1 } else { 0 };

    let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
        .bind(is_active_int)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_user(pool, user_id).await
}
