use sqlx::PgPool;

use crate::db::models::Department;

const COLUMNS: &str = "id, name, code";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(&format!("SELECT {COLUMNS} FROM departments ORDER BY name"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    name: &str,
    code: &str,
) -> Result<Department, sqlx::Error> {
    sqlx::query_as::<_, Department>(&format!(
        "INSERT INTO departments (id, name, code) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(code)
    .fetch_one(pool)
    .await
}

/// Case-insensitive match on either the name or the code, name first.
pub(crate) async fn find_by_name_or_code(
    pool: &PgPool,
    key: &str,
) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(&format!(
        "SELECT {COLUMNS} FROM departments
         WHERE lower(name) = lower($1) OR lower(code) = lower($1)
         ORDER BY (lower(name) = lower($1)) DESC, code
         LIMIT 1"
    ))
    .bind(key.trim())
    .fetch_optional(pool)
    .await
}
