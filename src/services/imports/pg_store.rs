use async_trait::async_trait;
use sqlx::PgPool;

use super::{AttendanceWrite, CourseRef, GradeWrite, ImportStore, StudentWrite, UserRef};
use crate::core::time::primitive_now_utc;
use crate::repositories::{self, UpsertOutcome};

/// [`ImportStore`] backed by the Postgres repositories.
#[derive(Clone)]
pub(crate) struct PgImportStore {
    pool: PgPool,
}

impl PgImportStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImportStore for PgImportStore {
    async fn course_by_key(&self, key: &str) -> Result<Option<CourseRef>, sqlx::Error> {
        Ok(repositories::courses::find_by_code_or_name(&self.pool, key).await?.map(|course| {
            CourseRef {
                id: course.id,
                name: course.name,
                code: course.code,
                semester: course.semester,
            }
        }))
    }

    async fn department_by_key(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        Ok(repositories::departments::find_by_name_or_code(&self.pool, key)
            .await?
            .map(|department| department.id))
    }

    async fn level_by_name(&self, name: &str) -> Result<Option<String>, sqlx::Error> {
        Ok(repositories::levels::find_by_name(&self.pool, name).await?.map(|level| level.id))
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<UserRef>, sqlx::Error> {
        Ok(repositories::users::find_by_username(&self.pool, username).await?.map(|user| {
            UserRef { id: user.id, username: user.username, role: user.role }
        }))
    }

    async fn has_assignment(&self, doctor_id: &str, course_id: &str) -> Result<bool, sqlx::Error> {
        repositories::teaching_assignments::exists_for(&self.pool, doctor_id, course_id).await
    }

    async fn upsert_grade(&self, write: &GradeWrite) -> Result<UpsertOutcome, sqlx::Error> {
        repositories::grades::upsert(
            &self.pool,
            &write.student_id,
            &write.course_id,
            write.score,
            write.semester,
            primitive_now_utc(),
        )
        .await
    }

    async fn upsert_attendance(
        &self,
        write: &AttendanceWrite,
    ) -> Result<UpsertOutcome, sqlx::Error> {
        repositories::attendance::upsert(
            &self.pool,
            repositories::attendance::UpsertAttendance {
                student_id: &write.student_id,
                course_id: &write.course_id,
                attended_lectures: write.attended_lectures,
                total_lectures: write.total_lectures,
                recorded_on: write.recorded_on,
                now: primitive_now_utc(),
            },
        )
        .await
    }

    async fn upsert_student(
        &self,
        write: &StudentWrite,
    ) -> Result<Option<UpsertOutcome>, sqlx::Error> {
        repositories::users::upsert_student(
            &self.pool,
            repositories::users::UpsertStudent {
                username: &write.username,
                full_name: &write.full_name,
                department_id: &write.department_id,
                level_id: &write.level_id,
                national_id: write.national_id.as_deref(),
                now: primitive_now_utc(),
            },
        )
        .await
    }
}
