use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Material;

const COLUMNS: &str =
    "id, course_id, title, file_key, content_type, file_size, uploaded_by, uploaded_at";

pub(crate) struct CreateMaterial<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) file_key: &'a str,
    pub(crate) content_type: &'a str,
    pub(crate) file_size: i64,
    pub(crate) uploaded_by: &'a str,
    pub(crate) uploaded_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateMaterial<'_>,
) -> Result<Material, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "INSERT INTO materials (
            id, course_id, title, file_key, content_type, file_size, uploaded_by, uploaded_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.file_key)
    .bind(params.content_type)
    .bind(params.file_size)
    .bind(params.uploaded_by)
    .bind(params.uploaded_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!("SELECT {COLUMNS} FROM materials WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "SELECT {COLUMNS} FROM materials WHERE course_id = $1 ORDER BY uploaded_at DESC"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM materials WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}
