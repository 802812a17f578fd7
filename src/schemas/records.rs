use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_date;
use crate::db::models::{AttendanceView, GradeView};
use crate::db::types::Semester;
use crate::services::grading::{attendance_percentage, letter_grade};

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

/// Grade with the names shown next to it. `student_id` is the student's username.
#[derive(Debug, Serialize)]
pub(crate) struct GradeResponse {
    pub(crate) id: String,
    pub(crate) score: Option<f64>,
    pub(crate) letter_grade: &'static str,
    pub(crate) semester: Semester,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) course_code: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) department: String,
    pub(crate) level: String,
}

impl GradeResponse {
    pub(crate) fn from_view(view: GradeView) -> Self {
        Self {
            id: view.id,
            letter_grade: letter_grade(view.score),
            score: view.score,
            semester: view.semester,
            course_id: view.course_id,
            course_name: view.course_name,
            course_code: view.course_code,
            student_id: view.student_username,
            student_name: view.student_name,
            department: or_dash(view.department_name),
            level: or_dash(view.level_name),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GradeUpdate {
    #[validate(range(min = 0.0, max = 100.0, message = "score must be between 0 and 100"))]
    pub(crate) score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttendanceResponse {
    pub(crate) id: String,
    pub(crate) course_code: String,
    pub(crate) course_name: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) attended_lectures: i32,
    pub(crate) total_lectures: i32,
    pub(crate) percentage: f64,
    pub(crate) recorded_on: Option<String>,
}

impl AttendanceResponse {
    pub(crate) fn from_view(view: AttendanceView) -> Self {
        Self {
            id: view.id,
            course_code: view.course_code,
            course_name: view.course_name,
            student_id: view.student_username,
            student_name: view.student_name,
            percentage: attendance_percentage(view.attended_lectures, view.total_lectures),
            attended_lectures: view.attended_lectures,
            total_lectures: view.total_lectures,
            recorded_on: view.recorded_on.map(format_date),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseQuery {
    pub(crate) course_id: String,
}
