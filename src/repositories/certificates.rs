use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Certificate;

const COLUMNS: &str = "id, student_id, file_key, uploaded_by, uploaded_at";

/// Returns `None` when the student already holds a certificate.
pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    student_id: &str,
    file_key: &str,
    uploaded_by: &str,
    uploaded_at: PrimitiveDateTime,
) -> Result<Option<Certificate>, sqlx::Error> {
    sqlx::query_as::<_, Certificate>(&format!(
        "INSERT INTO certificates (id, student_id, file_key, uploaded_by, uploaded_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (student_id) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(student_id)
    .bind(file_key)
    .bind(uploaded_by)
    .bind(uploaded_at)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Option<Certificate>, sqlx::Error> {
    sqlx::query_as::<_, Certificate>(&format!(
        "SELECT {COLUMNS} FROM certificates WHERE student_id = $1"
    ))
    .bind(student_id)
    .fetch_optional(pool)
    .await
}
