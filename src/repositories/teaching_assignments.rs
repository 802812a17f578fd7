use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::TeachingAssignment;
use crate::db::types::Semester;

const COLUMNS: &str = "id, doctor_id, course_id, academic_year_id, level_id, semester, created_at";

pub(crate) struct CreateAssignment<'a> {
    pub(crate) id: &'a str,
    pub(crate) doctor_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) academic_year_id: &'a str,
    pub(crate) level_id: &'a str,
    pub(crate) semester: Semester,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAssignment<'_>,
) -> Result<TeachingAssignment, sqlx::Error> {
    sqlx::query_as::<_, TeachingAssignment>(&format!(
        "INSERT INTO teaching_assignments (
            id, doctor_id, course_id, academic_year_id, level_id, semester, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.doctor_id)
    .bind(params.course_id)
    .bind(params.academic_year_id)
    .bind(params.level_id)
    .bind(params.semester)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

/// Any assignment of the doctor to the course counts, whatever its year, level or semester.
pub(crate) async fn exists_for(
    pool: &PgPool,
    doctor_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(
            SELECT 1 FROM teaching_assignments WHERE doctor_id = $1 AND course_id = $2
         )",
    )
    .bind(doctor_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM teaching_assignments WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct AssignmentRow {
    pub(crate) id: String,
    pub(crate) doctor_id: String,
    pub(crate) doctor_name: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) course_code: String,
    pub(crate) academic_year_id: String,
    pub(crate) academic_year: String,
    pub(crate) level_id: String,
    pub(crate) level_name: String,
    pub(crate) semester: Semester,
}

const ROW_QUERY: &str = "\
    SELECT ta.id, ta.doctor_id, u.full_name AS doctor_name,
           ta.course_id, c.name AS course_name, c.code AS course_code,
           ta.academic_year_id, y.year AS academic_year,
           ta.level_id, l.name AS level_name, ta.semester
    FROM teaching_assignments ta
    JOIN users u ON u.id = ta.doctor_id
    JOIN courses c ON c.id = ta.course_id
    JOIN academic_years y ON y.id = ta.academic_year_id
    JOIN levels l ON l.id = ta.level_id";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<AssignmentRow>, sqlx::Error> {
    sqlx::query_as::<_, AssignmentRow>(&format!(
        "{ROW_QUERY} ORDER BY y.year DESC, c.code, u.full_name"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_doctor(
    pool: &PgPool,
    doctor_id: &str,
) -> Result<Vec<AssignmentRow>, sqlx::Error> {
    sqlx::query_as::<_, AssignmentRow>(&format!(
        "{ROW_QUERY} WHERE ta.doctor_id = $1 ORDER BY y.year DESC, c.code"
    ))
    .bind(doctor_id)
    .fetch_all(pool)
    .await
}
