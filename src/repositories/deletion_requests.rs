use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::DeletionRequest;
use crate::db::types::DeletionTarget;

const COLUMNS: &str =
    "id, requester_id, target_type, target_id, target_name, is_approved, created_at, resolved_at";

pub(crate) struct CreateDeletionRequest<'a> {
    pub(crate) id: &'a str,
    pub(crate) requester_id: &'a str,
    pub(crate) target_type: DeletionTarget,
    pub(crate) target_id: &'a str,
    pub(crate) target_name: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateDeletionRequest<'_>,
) -> Result<DeletionRequest, sqlx::Error> {
    sqlx::query_as::<_, DeletionRequest>(&format!(
        "INSERT INTO deletion_requests (
            id, requester_id, target_type, target_id, target_name, is_approved, created_at
         ) VALUES ($1,$2,$3,$4,$5,FALSE,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.requester_id)
    .bind(params.target_type)
    .bind(params.target_id)
    .bind(params.target_name)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<DeletionRequest>, sqlx::Error> {
    sqlx::query_as::<_, DeletionRequest>(&format!(
        "SELECT {COLUMNS} FROM deletion_requests ORDER BY is_approved, created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<DeletionRequest>, sqlx::Error> {
    sqlx::query_as::<_, DeletionRequest>(&format!(
        "SELECT {COLUMNS} FROM deletion_requests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn mark_approved(
    pool: &PgPool,
    id: &str,
    resolved_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE deletion_requests SET is_approved = TRUE, resolved_at = $1 WHERE id = $2")
        .bind(resolved_at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM deletion_requests WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}
