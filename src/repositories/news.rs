use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::News;

const COLUMNS: &str = "id, title, content, is_public, created_at";

pub(crate) async fn list_public(pool: &PgPool, limit: i64) -> Result<Vec<News>, sqlx::Error> {
    sqlx::query_as::<_, News>(&format!(
        "SELECT {COLUMNS} FROM news WHERE is_public ORDER BY created_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    title: &str,
    content: &str,
    is_public: bool,
    created_at: PrimitiveDateTime,
) -> Result<News, sqlx::Error> {
    sqlx::query_as::<_, News>(&format!(
        "INSERT INTO news (id, title, content, is_public, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(title)
    .bind(content)
    .bind(is_public)
    .bind(created_at)
    .fetch_one(pool)
    .await
}
