use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::types::{DeletionTarget, Semester, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Department {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AcademicYear {
    pub(crate) id: String,
    pub(crate) year: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Level {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) credit_hours: i32,
    pub(crate) department_id: String,
    pub(crate) level_id: Option<String>,
    pub(crate) semester: Semester,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TeachingAssignment {
    pub(crate) id: String,
    pub(crate) doctor_id: String,
    pub(crate) course_id: String,
    pub(crate) academic_year_id: String,
    pub(crate) level_id: String,
    pub(crate) semester: Semester,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) hashed_password: Option<String>,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) department_id: Option<String>,
    pub(crate) level_id: Option<String>,
    pub(crate) national_id: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) must_reset_password: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Grade {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) score: Option<f64>,
    pub(crate) semester: Semester,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Material {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) file_key: String,
    pub(crate) content_type: String,
    pub(crate) file_size: i64,
    pub(crate) uploaded_by: Option<String>,
    pub(crate) uploaded_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Certificate {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) file_key: String,
    pub(crate) uploaded_by: Option<String>,
    pub(crate) uploaded_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct DeletionRequest {
    pub(crate) id: String,
    pub(crate) requester_id: String,
    pub(crate) target_type: DeletionTarget,
    pub(crate) target_id: String,
    pub(crate) target_name: String,
    pub(crate) is_approved: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) resolved_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct News {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) is_public: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Grade joined with the names the portal shows next to it.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct GradeView {
    pub(crate) id: String,
    pub(crate) score: Option<f64>,
    pub(crate) semester: Semester,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) course_code: String,
    pub(crate) student_username: String,
    pub(crate) student_name: String,
    pub(crate) department_name: Option<String>,
    pub(crate) level_name: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct AttendanceView {
    pub(crate) id: String,
    pub(crate) course_name: String,
    pub(crate) course_code: String,
    pub(crate) student_username: String,
    pub(crate) student_name: String,
    pub(crate) attended_lectures: i32,
    pub(crate) total_lectures: i32,
    pub(crate) recorded_on: Option<Date>,
}
