use sqlx::PgPool;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::db::models::AttendanceView;
use crate::repositories::UpsertOutcome;

const VIEW_QUERY: &str = "\
    SELECT a.id, c.name AS course_name, c.code AS course_code,
           u.username AS student_username, u.full_name AS student_name,
           a.attended_lectures, a.total_lectures, a.recorded_on
    FROM attendance a
    JOIN courses c ON c.id = a.course_id
    JOIN users u ON u.id = a.student_id";

pub(crate) struct UpsertAttendance<'a> {
    pub(crate) student_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) attended_lectures: i32,
    pub(crate) total_lectures: i32,
    pub(crate) recorded_on: Option<Date>,
    pub(crate) now: PrimitiveDateTime,
}

/// Create-or-update keyed by (student, course).
pub(crate) async fn upsert(
    pool: &PgPool,
    params: UpsertAttendance<'_>,
) -> Result<UpsertOutcome, sqlx::Error> {
    let inserted: bool = sqlx::query_scalar(
        "INSERT INTO attendance (
            id, student_id, course_id, attended_lectures, total_lectures, recorded_on,
            created_at, updated_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
         ON CONFLICT (student_id, course_id) DO UPDATE SET
            attended_lectures = EXCLUDED.attended_lectures,
            total_lectures = EXCLUDED.total_lectures,
            recorded_on = COALESCE(EXCLUDED.recorded_on, attendance.recorded_on),
            updated_at = EXCLUDED.updated_at
         RETURNING (xmax = 0)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(params.student_id)
    .bind(params.course_id)
    .bind(params.attended_lectures)
    .bind(params.total_lectures)
    .bind(params.recorded_on)
    .bind(params.now)
    .fetch_one(pool)
    .await?;
    Ok(UpsertOutcome::from_inserted(inserted))
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<AttendanceView>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceView>(&format!(
        "{VIEW_QUERY} WHERE a.student_id = $1 ORDER BY c.code"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<AttendanceView>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceView>(&format!(
        "{VIEW_QUERY} WHERE a.course_id = $1 ORDER BY u.username"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}
