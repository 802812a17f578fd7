use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{AcademicYear, DeletionRequest, Department, Level, TeachingAssignment};
use crate::db::types::{DeletionTarget, Semester};
use crate::repositories::courses::CourseRow;
use crate::repositories::teaching_assignments::AssignmentRow;
use crate::services::deletion_requests::ApprovalResult;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct DepartmentCreate {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub(crate) name: String,
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub(crate) code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreate {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub(crate) name: String,
    #[validate(length(min = 1, max = 20, message = "code must be 1-20 characters"))]
    pub(crate) code: String,
    #[serde(default = "default_credit_hours")]
    #[validate(range(min = 0, max = 12, message = "credit_hours must be between 0 and 12"))]
    pub(crate) credit_hours: i32,
    pub(crate) department_id: String,
    #[serde(default)]
    pub(crate) level_id: Option<String>,
    #[serde(default = "default_semester")]
    pub(crate) semester: Semester,
}

fn default_credit_hours() -> i32 {
    3
}

fn default_semester() -> Semester {
    Semester::First
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseFilter {
    #[serde(default)]
    pub(crate) department_id: Option<String>,
    #[serde(default)]
    pub(crate) level_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) credit_hours: i32,
    pub(crate) semester: Semester,
    pub(crate) department_id: String,
    pub(crate) department: String,
    pub(crate) level_id: Option<String>,
    pub(crate) level: String,
}

impl CourseResponse {
    pub(crate) fn from_row(row: CourseRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            code: row.code,
            credit_hours: row.credit_hours,
            semester: row.semester,
            department_id: row.department_id,
            department: row.department_name,
            level_id: row.level_id,
            level: row.level_name.unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AcademicYearCreate {
    #[validate(length(min = 4, max = 20, message = "year must be 4-20 characters"))]
    pub(crate) year: String,
    #[serde(default = "default_true")]
    pub(crate) is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub(crate) struct AcademicYearResponse {
    pub(crate) id: String,
    pub(crate) year: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl AcademicYearResponse {
    pub(crate) fn from_db(year: AcademicYear) -> Self {
        Self {
            id: year.id,
            year: year.year,
            is_active: year.is_active,
            created_at: format_primitive(year.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LevelCreate {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LevelResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: String,
}

impl LevelResponse {
    pub(crate) fn from_db(level: Level) -> Self {
        Self { id: level.id, name: level.name, created_at: format_primitive(level.created_at) }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DepartmentResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
}

impl DepartmentResponse {
    pub(crate) fn from_db(department: Department) -> Self {
        Self { id: department.id, name: department.name, code: department.code }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DeletionRequestResponse {
    pub(crate) id: String,
    pub(crate) requester_id: String,
    pub(crate) target_type: DeletionTarget,
    pub(crate) target_id: String,
    pub(crate) target_name: String,
    pub(crate) is_approved: bool,
    pub(crate) created_at: String,
    pub(crate) resolved_at: Option<String>,
}

impl DeletionRequestResponse {
    pub(crate) fn from_db(request: DeletionRequest) -> Self {
        Self {
            id: request.id,
            requester_id: request.requester_id,
            target_type: request.target_type,
            target_id: request.target_id,
            target_name: request.target_name,
            is_approved: request.is_approved,
            created_at: format_primitive(request.created_at),
            resolved_at: request.resolved_at.map(format_primitive),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ApproveRequests {
    #[validate(length(min = 1, max = 100, message = "ids must hold 1-100 request ids"))]
    pub(crate) ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApproveResponse {
    pub(crate) results: Vec<ApprovalResult>,
}

/// Either the target was deleted or a deletion request was filed.
#[derive(Debug, Serialize)]
pub(crate) struct DestroyResponse {
    pub(crate) status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) request: Option<DeletionRequestResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeachingAssignmentCreate {
    pub(crate) doctor_id: String,
    pub(crate) course_id: String,
    pub(crate) academic_year_id: String,
    pub(crate) level_id: String,
    pub(crate) semester: Semester,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeachingAssignmentResponse {
    pub(crate) id: String,
    pub(crate) doctor_id: String,
    pub(crate) doctor_name: String,
    pub(crate) course_id: String,
    pub(crate) course_name: String,
    pub(crate) course_code: String,
    pub(crate) academic_year_id: String,
    pub(crate) academic_year: String,
    pub(crate) level_id: String,
    pub(crate) level: String,
    pub(crate) semester: Semester,
}

impl TeachingAssignmentResponse {
    pub(crate) fn from_row(row: AssignmentRow) -> Self {
        Self {
            id: row.id,
            doctor_id: row.doctor_id,
            doctor_name: row.doctor_name,
            course_id: row.course_id,
            course_name: row.course_name,
            course_code: row.course_code,
            academic_year_id: row.academic_year_id,
            academic_year: row.academic_year,
            level_id: row.level_id,
            level: row.level_name,
            semester: row.semester,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TeachingAssignmentCreated {
    pub(crate) id: String,
    pub(crate) doctor_id: String,
    pub(crate) course_id: String,
    pub(crate) academic_year_id: String,
    pub(crate) level_id: String,
    pub(crate) semester: Semester,
    pub(crate) created_at: String,
}

impl TeachingAssignmentCreated {
    pub(crate) fn from_db(assignment: TeachingAssignment) -> Self {
        Self {
            id: assignment.id,
            doctor_id: assignment.doctor_id,
            course_id: assignment.course_id,
            academic_year_id: assignment.academic_year_id,
            level_id: assignment.level_id,
            semester: assignment.semester,
            created_at: format_primitive(assignment.created_at),
        }
    }
}
