use sqlx::{FromRow, PgPool};

use crate::db::models::Course;
use crate::db::types::Semester;

const COLUMNS: &str = "id, name, code, credit_hours, department_id, level_id, semester";

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) code: &'a str,
    pub(crate) credit_hours: i32,
    pub(crate) department_id: &'a str,
    pub(crate) level_id: Option<&'a str>,
    pub(crate) semester: Semester,
}

pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (id, name, code, credit_hours, department_id, level_id, semester)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.code)
    .bind(params.credit_hours)
    .bind(params.department_id)
    .bind(params.level_id)
    .bind(params.semester)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Case-insensitive exact match, preferring a code hit over a name hit.
/// Several courses may share a name; the lowest code wins.
pub(crate) async fn find_by_code_or_name(
    pool: &PgPool,
    key: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COLUMNS} FROM courses
         WHERE lower(code) = lower($1) OR lower(name) = lower($1)
         ORDER BY (lower(code) = lower($1)) DESC, code
         LIMIT 1"
    ))
    .bind(key.trim())
    .fetch_optional(pool)
    .await
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct CourseRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) credit_hours: i32,
    pub(crate) semester: Semester,
    pub(crate) department_id: String,
    pub(crate) department_name: String,
    pub(crate) level_id: Option<String>,
    pub(crate) level_name: Option<String>,
}

const ROW_QUERY: &str = "\
    SELECT c.id, c.name, c.code, c.credit_hours, c.semester,
           c.department_id, d.name AS department_name,
           c.level_id, l.name AS level_name
    FROM courses c
    JOIN departments d ON d.id = c.department_id
    LEFT JOIN levels l ON l.id = c.level_id";

pub(crate) async fn list(
    pool: &PgPool,
    department_id: Option<&str>,
    level_id: Option<&str>,
) -> Result<Vec<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(&format!(
        "{ROW_QUERY}
         WHERE ($1::text IS NULL OR c.department_id = $1)
           AND ($2::text IS NULL OR c.level_id = $2)
         ORDER BY c.code"
    ))
    .bind(department_id)
    .bind(level_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_row(pool: &PgPool, id: &str) -> Result<Option<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(&format!("{ROW_QUERY} WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}
