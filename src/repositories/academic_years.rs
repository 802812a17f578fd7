use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::AcademicYear;

const COLUMNS: &str = "id, year, is_active, created_at";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<AcademicYear>, sqlx::Error> {
    sqlx::query_as::<_, AcademicYear>(&format!(
        "SELECT {COLUMNS} FROM academic_years ORDER BY year DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    year: &str,
    is_active: bool,
    created_at: PrimitiveDateTime,
) -> Result<AcademicYear, sqlx::Error> {
    sqlx::query_as::<_, AcademicYear>(&format!(
        "INSERT INTO academic_years (id, year, is_active, created_at)
         VALUES ($1, $2, $3, $4)
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(year)
    .bind(is_active)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<AcademicYear>, sqlx::Error> {
    sqlx::query_as::<_, AcademicYear>(&format!("SELECT {COLUMNS} FROM academic_years WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM academic_years WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
