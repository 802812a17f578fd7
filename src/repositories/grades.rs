use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::{Grade, GradeView};
use crate::db::types::Semester;
use crate::repositories::UpsertOutcome;

const COLUMNS: &str = "id, student_id, course_id, score, semester, created_at, updated_at";

const VIEW_QUERY: &str = "\
    SELECT g.id, g.score, g.semester, g.course_id,
           c.name AS course_name, c.code AS course_code,
           u.username AS student_username, u.full_name AS student_name,
           d.name AS department_name, l.name AS level_name
    FROM grades g
    JOIN courses c ON c.id = g.course_id
    JOIN users u ON u.id = g.student_id
    LEFT JOIN departments d ON d.id = u.department_id
    LEFT JOIN levels l ON l.id = u.level_id";

/// Create-or-update keyed by (student, course). Only score and semester change on update.
pub(crate) async fn upsert(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
    score: Option<f64>,
    semester: Semester,
    now: PrimitiveDateTime,
) -> Result<UpsertOutcome, sqlx::Error> {
    let inserted: bool = sqlx::query_scalar(
        "INSERT INTO grades (id, student_id, course_id, score, semester, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6)
         ON CONFLICT (student_id, course_id) DO UPDATE SET
            score = EXCLUDED.score,
            semester = EXCLUDED.semester,
            updated_at = EXCLUDED.updated_at
         RETURNING (xmax = 0)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(student_id)
    .bind(course_id)
    .bind(score)
    .bind(semester)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(UpsertOutcome::from_inserted(inserted))
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Grade>, sqlx::Error> {
    sqlx::query_as::<_, Grade>(&format!("SELECT {COLUMNS} FROM grades WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn update_score(
    pool: &PgPool,
    id: &str,
    score: Option<f64>,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE grades SET score = $1, updated_at = $2 WHERE id = $3")
        .bind(score)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn find_view(pool: &PgPool, id: &str) -> Result<Option<GradeView>, sqlx::Error> {
    sqlx::query_as::<_, GradeView>(&format!("{VIEW_QUERY} WHERE g.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<GradeView>, sqlx::Error> {
    sqlx::query_as::<_, GradeView>(&format!(
        "{VIEW_QUERY} WHERE g.student_id = $1 ORDER BY g.semester, c.code"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<GradeView>, sqlx::Error> {
    sqlx::query_as::<_, GradeView>(&format!(
        "{VIEW_QUERY} WHERE g.course_id = $1 ORDER BY u.username"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}
