use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_access, require_student, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::records::{AttendanceResponse, CourseQuery, GradeResponse, GradeUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/my-grades", get(my_grades))
        .route("/my-attendance", get(my_attendance))
        .route("/doctor/grades", get(course_grades))
        .route("/doctor/grades/:id", put(update_grade))
        .route("/doctor/attendance", get(course_attendance))
}

async fn my_grades(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<GradeResponse>>, ApiError> {
    require_student(&user)?;
    let grades = repositories::grades::list_for_student(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list grades"))?;
    Ok(Json(grades.into_iter().map(GradeResponse::from_view).collect()))
}

async fn my_attendance(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AttendanceResponse>>, ApiError> {
    require_student(&user)?;
    let records = repositories::attendance::list_for_student(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list attendance"))?;
    Ok(Json(records.into_iter().map(AttendanceResponse::from_view).collect()))
}

async fn course_grades(
    Query(query): Query<CourseQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<GradeResponse>>, ApiError> {
    require_course_access(&state, &user, &query.course_id).await?;
    let grades = repositories::grades::list_for_course(state.db(), &query.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list course grades"))?;
    Ok(Json(grades.into_iter().map(GradeResponse::from_view).collect()))
}

async fn update_grade(
    Path(id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<GradeUpdate>,
) -> Result<Json<GradeResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let grade = repositories::grades::find_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load grade"))?
        .ok_or_else(|| ApiError::NotFound("Grade not found".to_string()))?;
    require_course_access(&state, &user, &grade.course_id).await?;

    repositories::grades::update_score(state.db(), &grade.id, payload.score, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update grade"))?;
    tracing::info!(grade_id = %grade.id, user_id = %user.id, score = ?payload.score, "Grade updated");

    let view = repositories::grades::find_view(state.db(), &grade.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load grade"))?
        .ok_or_else(|| ApiError::NotFound("Grade not found".to_string()))?;
    Ok(Json(GradeResponse::from_view(view)))
}

async fn course_attendance(
    Query(query): Query<CourseQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AttendanceResponse>>, ApiError> {
    require_course_access(&state, &user, &query.course_id).await?;
    let records = repositories::attendance::list_for_course(state.db(), &query.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list course attendance"))?;
    Ok(Json(records.into_iter().map(AttendanceResponse::from_view).collect()))
}
