use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::user::{
    CredentialsResponse, StudentFilter, StudentResponse, StudentUpdate, UserResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/students", get(list_students))
        .route("/students/:id/manage", put(update_student).delete(delete_student))
        .route("/students/:id/credentials", post(issue_credentials))
}

async fn list_students(
    Query(filter): Query<StudentFilter>,
    CurrentStaff(_staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let rows = repositories::users::list_students(
        state.db(),
        filter.dept.as_deref().filter(|v| !v.is_empty()),
        filter.level.as_deref().filter(|v| !v.is_empty()),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list students"))?;
    Ok(Json(rows.into_iter().map(StudentResponse::from_row).collect()))
}

async fn update_student(
    Path(id): Path<String>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<StudentUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let updated = repositories::users::update_profile(
        state.db(),
        &id,
        repositories::users::UpdateProfile {
            full_name: payload.full_name.as_deref().map(str::trim),
            department_id: payload.department_id.as_deref(),
            level_id: payload.level_id.as_deref(),
            national_id: payload.national_id.as_deref(),
            is_active: payload.is_active,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_insert(e, "Failed to update student", "Student already exists"))?
    .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    tracing::info!(student_id = %updated.id, staff_id = %staff.id, "Student updated");
    Ok(Json(UserResponse::from_db(updated)))
}

async fn delete_student(
    Path(id): Path<String>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::users::delete_student(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete student"))?;
    if !deleted {
        return Err(ApiError::NotFound("Student not found".to_string()));
    }

    tracing::info!(student_id = %id, staff_id = %staff.id, "Student deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Issues a random one-time password. The plain value is only ever in this response.
async fn issue_credentials(
    Path(id): Path<String>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CredentialsResponse>), ApiError> {
    let student = repositories::users::find_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;
    match student.role {
        UserRole::Student => {}
        UserRole::Doctor | UserRole::StaffAffairs | UserRole::Admin => {
            return Err(ApiError::NotFound("Student not found".to_string()));
        }
    }

    let one_time_password = security::generate_one_time_password();
    let hashed = security::hash_password(&one_time_password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    repositories::users::set_password(state.db(), &student.id, &hashed, true, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store credentials"))?;

    tracing::info!(student_id = %student.id, staff_id = %staff.id, "One-time password issued");
    Ok((
        StatusCode::CREATED,
        Json(CredentialsResponse {
            username: student.username,
            one_time_password,
            must_reset_password: true,
        }),
    ))
}

#[cfg(test)]
mod tests;
