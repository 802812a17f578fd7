use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Level;

const COLUMNS: &str = "id, name, created_at";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Level>, sqlx::Error> {
    sqlx::query_as::<_, Level>(&format!("SELECT {COLUMNS} FROM levels ORDER BY created_at, name"))
        .fetch_all(pool)
        .await
}

#[cfg(test)]
pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM levels").fetch_one(pool).await
}

/// Inserts only while fewer than `cap` levels exist. Returns `None` when the cap is reached.
///
/// The table lock keeps two concurrent creations from both passing the count.
pub(crate) async fn create_within_cap(
    pool: &PgPool,
    id: &str,
    name: &str,
    cap: i64,
    created_at: PrimitiveDateTime,
) -> Result<Option<Level>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("LOCK TABLE levels IN SHARE ROW EXCLUSIVE MODE").execute(&mut *tx).await?;
    let level = sqlx::query_as::<_, Level>(&format!(
        "INSERT INTO levels (id, name, created_at)
         SELECT $1, $2, $3
         WHERE (SELECT COUNT(*) FROM levels) < $4
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(created_at)
    .bind(cap)
    .fetch_optional(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(level)
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Level>, sqlx::Error> {
    sqlx::query_as::<_, Level>(&format!("SELECT {COLUMNS} FROM levels WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Level>, sqlx::Error> {
    sqlx::query_as::<_, Level>(&format!(
        "SELECT {COLUMNS} FROM levels WHERE lower(name) = lower($1) ORDER BY created_at LIMIT 1"
    ))
    .bind(name.trim())
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM levels WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
