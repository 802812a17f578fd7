use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::{DeletionTarget, UserRole};
use crate::repositories;
use crate::schemas::catalog::{
    AcademicYearCreate, AcademicYearResponse, ApproveRequests, ApproveResponse, CourseCreate,
    CourseFilter, CourseResponse, DeletionRequestResponse, DepartmentCreate, DepartmentResponse,
    DestroyResponse, LevelCreate, LevelResponse, TeachingAssignmentCreate,
    TeachingAssignmentCreated, TeachingAssignmentResponse,
};
use crate::services::authorization::can_create_structure;
use crate::services::deletion_requests::{self, DestroyOutcome};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/departments", get(list_departments).post(create_department))
        .route("/courses", get(list_courses).post(create_course))
        .route("/academic-years", get(list_years).post(create_year))
        .route("/academic-years/:id", delete(destroy_year))
        .route("/levels", get(list_levels).post(create_level))
        .route("/levels/:id", delete(destroy_level))
        .route("/deletion-requests", get(list_deletion_requests))
        .route("/deletion-requests/approve", post(approve_deletion_requests))
        .route("/teaching-assignments", get(list_assignments).post(create_assignment))
        .route("/teaching-assignments/:id", delete(delete_assignment))
        .route("/doctor/courses", get(doctor_courses))
}

async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<Vec<DepartmentResponse>>, ApiError> {
    let departments = repositories::departments::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list departments"))?;
    Ok(Json(departments.into_iter().map(DepartmentResponse::from_db).collect()))
}

async fn create_department(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<DepartmentCreate>,
) -> Result<(StatusCode, Json<DepartmentResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let department = repositories::departments::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        payload.name.trim(),
        payload.code.trim(),
    )
    .await
    .map_err(|e| {
        ApiError::from_insert(e, "Failed to create department", "Department code already exists")
    })?;

    Ok((StatusCode::CREATED, Json(DepartmentResponse::from_db(department))))
}

async fn list_courses(
    Query(filter): Query<CourseFilter>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = repositories::courses::list(
        state.db(),
        filter.department_id.as_deref(),
        filter.level_id.as_deref(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;
    Ok(Json(courses.into_iter().map(CourseResponse::from_row).collect()))
}

async fn create_course(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            code: payload.code.trim(),
            credit_hours: payload.credit_hours,
            department_id: &payload.department_id,
            level_id: payload.level_id.as_deref(),
            semester: payload.semester,
        },
    )
    .await
    .map_err(|e| ApiError::from_insert(e, "Failed to create course", "Course code already exists"))?;

    let row = repositories::courses::find_row(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(CourseResponse::from_row(row))))
}

async fn list_years(
    State(state): State<AppState>,
) -> Result<Json<Vec<AcademicYearResponse>>, ApiError> {
    let years = repositories::academic_years::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list academic years"))?;
    Ok(Json(years.into_iter().map(AcademicYearResponse::from_db).collect()))
}

async fn create_year(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AcademicYearCreate>,
) -> Result<(StatusCode, Json<AcademicYearResponse>), ApiError> {
    require_structure_editor(user.role)?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let year = repositories::academic_years::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        payload.year.trim(),
        payload.is_active,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| {
        ApiError::from_insert(e, "Failed to create academic year", "Academic year already exists")
    })?;

    Ok((StatusCode::CREATED, Json(AcademicYearResponse::from_db(year))))
}

async fn destroy_year(
    Path(id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    destroy(&state, &user.id, user.role, DeletionTarget::Year, &id).await
}

async fn list_levels(State(state): State<AppState>) -> Result<Json<Vec<LevelResponse>>, ApiError> {
    let levels = repositories::levels::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list levels"))?;
    Ok(Json(levels.into_iter().map(LevelResponse::from_db).collect()))
}

async fn create_level(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<LevelCreate>,
) -> Result<(StatusCode, Json<LevelResponse>), ApiError> {
    require_structure_editor(user.role)?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let cap = state.settings().academic().max_levels;
    let level = repositories::levels::create_within_cap(
        state.db(),
        &Uuid::new_v4().to_string(),
        payload.name.trim(),
        cap,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::from_insert(e, "Failed to create level", "Level already exists"))?
    .ok_or_else(|| ApiError::BadRequest(format!("Cannot create more than {cap} levels")))?;

    Ok((StatusCode::CREATED, Json(LevelResponse::from_db(level))))
}

async fn destroy_level(
    Path(id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    destroy(&state, &user.id, user.role, DeletionTarget::Level, &id).await
}

async fn destroy(
    state: &AppState,
    user_id: &str,
    role: UserRole,
    target: DeletionTarget,
    id: &str,
) -> Result<Response, ApiError> {
    let outcome = deletion_requests::destroy_or_request(state.db(), user_id, role, target, id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete academic structure"))?;

    match outcome {
        DestroyOutcome::Deleted => Ok(StatusCode::NO_CONTENT.into_response()),
        DestroyOutcome::Requested(request) => Ok((
            StatusCode::ACCEPTED,
            Json(DestroyResponse {
                status: "requested",
                request: Some(DeletionRequestResponse::from_db(request)),
            }),
        )
            .into_response()),
        DestroyOutcome::TargetNotFound => Err(ApiError::NotFound(format!("{target:?} not found"))),
        DestroyOutcome::Forbidden => Err(ApiError::forbidden("Not allowed to delete this")),
    }
}

fn require_structure_editor(role: UserRole) -> Result<(), ApiError> {
    if can_create_structure(role) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Staff access required"))
    }
}

async fn list_deletion_requests(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<DeletionRequestResponse>>, ApiError> {
    let requests = repositories::deletion_requests::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list deletion requests"))?;
    Ok(Json(requests.into_iter().map(DeletionRequestResponse::from_db).collect()))
}

async fn approve_deletion_requests(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ApproveRequests>,
) -> Result<Json<ApproveResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let results = deletion_requests::approve(state.db(), &payload.ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to approve deletion requests"))?;

    tracing::info!(admin_id = %admin.id, count = results.len(), "Deletion requests reviewed");
    Ok(Json(ApproveResponse { results }))
}

async fn list_assignments(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeachingAssignmentResponse>>, ApiError> {
    let rows = repositories::teaching_assignments::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list teaching assignments"))?;
    Ok(Json(rows.into_iter().map(TeachingAssignmentResponse::from_row).collect()))
}

async fn create_assignment(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<TeachingAssignmentCreate>,
) -> Result<(StatusCode, Json<TeachingAssignmentCreated>), ApiError> {
    let doctor = repositories::users::find_by_id(state.db(), &payload.doctor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load doctor"))?
        .ok_or_else(|| ApiError::NotFound("Doctor not found".to_string()))?;
    match doctor.role {
        UserRole::Doctor => {}
        UserRole::Student | UserRole::StaffAffairs | UserRole::Admin => {
            return Err(ApiError::BadRequest("Assignments can only target doctors".to_string()));
        }
    }

    let assignment = repositories::teaching_assignments::create(
        state.db(),
        repositories::teaching_assignments::CreateAssignment {
            id: &Uuid::new_v4().to_string(),
            doctor_id: &doctor.id,
            course_id: &payload.course_id,
            academic_year_id: &payload.academic_year_id,
            level_id: &payload.level_id,
            semester: payload.semester,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        ApiError::from_insert(e, "Failed to create teaching assignment", "Assignment already exists")
    })?;

    Ok((StatusCode::CREATED, Json(TeachingAssignmentCreated::from_db(assignment))))
}

async fn delete_assignment(
    Path(id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::teaching_assignments::delete(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete teaching assignment"))?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Teaching assignment not found".to_string()))
    }
}

async fn doctor_courses(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeachingAssignmentResponse>>, ApiError> {
    match user.role {
        UserRole::Doctor => {}
        UserRole::Student | UserRole::StaffAffairs | UserRole::Admin => {
            return Err(ApiError::forbidden("Only doctors have teaching assignments"));
        }
    }

    let rows = repositories::teaching_assignments::list_for_doctor(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list teaching assignments"))?;
    Ok(Json(rows.into_iter().map(TeachingAssignmentResponse::from_row).collect()))
}

#[cfg(test)]
mod tests;
