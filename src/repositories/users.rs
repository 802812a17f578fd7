use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories::UpsertOutcome;

const COLUMNS: &str = "\
    id, username, hashed_password, full_name, role, department_id, level_id, \
    national_id, is_active, must_reset_password, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Usernames are unique, but lookups ignore case so spreadsheet entries match.
pub(crate) async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE lower(username) = lower($1) ORDER BY username LIMIT 1"
    ))
    .bind(username.trim())
    .fetch_optional(pool)
    .await
}

pub(crate) struct CreateUser<'a> {
    pub(crate) id: &'a str,
    pub(crate) username: &'a str,
    pub(crate) hashed_password: Option<String>,
    pub(crate) full_name: &'a str,
    pub(crate) role: UserRole,
    pub(crate) department_id: Option<&'a str>,
    pub(crate) level_id: Option<&'a str>,
    pub(crate) national_id: Option<&'a str>,
    pub(crate) must_reset_password: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, username, hashed_password, full_name, role, department_id, level_id,
            national_id, is_active, must_reset_password, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,TRUE,$9,$10,$10)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.username)
    .bind(params.hashed_password)
    .bind(params.full_name)
    .bind(params.role)
    .bind(params.department_id)
    .bind(params.level_id)
    .bind(params.national_id)
    .bind(params.must_reset_password)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateUser {
    pub(crate) full_name: Option<String>,
    pub(crate) role: Option<UserRole>,
    pub(crate) is_active: Option<bool>,
    pub(crate) hashed_password: Option<String>,
    pub(crate) must_reset_password: Option<bool>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(pool: &PgPool, id: &str, params: UpdateUser) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET
            full_name = COALESCE($1, full_name),
            role = COALESCE($2, role),
            is_active = COALESCE($3, is_active),
            hashed_password = COALESCE($4, hashed_password),
            must_reset_password = COALESCE($5, must_reset_password),
            updated_at = $6
         WHERE id = $7",
    )
    .bind(params.full_name)
    .bind(params.role)
    .bind(params.is_active)
    .bind(params.hashed_password)
    .bind(params.must_reset_password)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) struct UpdateProfile<'a> {
    pub(crate) full_name: Option<&'a str>,
    pub(crate) department_id: Option<&'a str>,
    pub(crate) level_id: Option<&'a str>,
    pub(crate) national_id: Option<&'a str>,
    pub(crate) is_active: Option<bool>,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Overwrites the mutable profile fields of a student. `None` keeps the stored value.
pub(crate) async fn update_profile(
    pool: &PgPool,
    id: &str,
    params: UpdateProfile<'_>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET
            full_name = COALESCE($1, full_name),
            department_id = COALESCE($2, department_id),
            level_id = COALESCE($3, level_id),
            national_id = COALESCE($4, national_id),
            is_active = COALESCE($5, is_active),
            updated_at = $6
         WHERE id = $7 AND role = 'STUDENT'
         RETURNING {COLUMNS}",
    ))
    .bind(params.full_name)
    .bind(params.department_id)
    .bind(params.level_id)
    .bind(params.national_id)
    .bind(params.is_active)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn set_password(
    pool: &PgPool,
    id: &str,
    hashed_password: &str,
    must_reset_password: bool,
    updated_at: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET hashed_password = $1, must_reset_password = $2, updated_at = $3
         WHERE id = $4",
    )
    .bind(hashed_password)
    .bind(must_reset_password)
    .bind(updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete_student(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role = 'STUDENT'")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct StudentRow {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) national_id: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) must_reset_password: bool,
    pub(crate) department_id: Option<String>,
    pub(crate) department_name: Option<String>,
    pub(crate) level_id: Option<String>,
    pub(crate) level_name: Option<String>,
}

pub(crate) async fn list_students(
    pool: &PgPool,
    department_id: Option<&str>,
    level_id: Option<&str>,
) -> Result<Vec<StudentRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentRow>(
        "SELECT u.id, u.username, u.full_name, u.national_id, u.is_active,
                u.must_reset_password, u.department_id, d.name AS department_name,
                u.level_id, l.name AS level_name
         FROM users u
         LEFT JOIN departments d ON d.id = u.department_id
         LEFT JOIN levels l ON l.id = u.level_id
         WHERE u.role = 'STUDENT'
           AND ($1::text IS NULL OR u.department_id = $1)
           AND ($2::text IS NULL OR u.level_id = $2)
         ORDER BY u.username",
    )
    .bind(department_id)
    .bind(level_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct UpsertStudent<'a> {
    pub(crate) username: &'a str,
    pub(crate) full_name: &'a str,
    pub(crate) department_id: &'a str,
    pub(crate) level_id: &'a str,
    pub(crate) national_id: Option<&'a str>,
    pub(crate) now: PrimitiveDateTime,
}

/// Roster upsert keyed by username. New accounts have no password and must reset it.
/// Returns `None` when the username belongs to a non-student account, which is left untouched.
pub(crate) async fn upsert_student(
    pool: &PgPool,
    params: UpsertStudent<'_>,
) -> Result<Option<UpsertOutcome>, sqlx::Error> {
    let inserted: Option<bool> = sqlx::query_scalar(
        "INSERT INTO users (
            id, username, hashed_password, full_name, role, department_id, level_id,
            national_id, is_active, must_reset_password, created_at, updated_at
         ) VALUES ($1, $2, NULL, $3, 'STUDENT', $4, $5, $6, TRUE, TRUE, $7, $7)
         ON CONFLICT (username) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            department_id = EXCLUDED.department_id,
            level_id = EXCLUDED.level_id,
            national_id = COALESCE(EXCLUDED.national_id, users.national_id),
            updated_at = EXCLUDED.updated_at
         WHERE users.role = 'STUDENT'
         RETURNING (xmax = 0)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(params.username)
    .bind(params.full_name)
    .bind(params.department_id)
    .bind(params.level_id)
    .bind(params.national_id)
    .bind(params.now)
    .fetch_optional(pool)
    .await?;
    Ok(inserted.map(UpsertOutcome::from_inserted))
}
