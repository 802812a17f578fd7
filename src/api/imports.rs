use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{principal, CurrentUser};
use crate::api::upload::UploadForm;
use crate::api::validation::validate_spreadsheet_upload;
use crate::core::state::AppState;
use crate::db::types::UserRole;
use crate::schemas::imports::{RecordImportResponse, RosterImportResponse};
use crate::services::authorization::{can_manage_students, course_scope, CourseScope};
use crate::services::imports::{self, pg_store::PgImportStore, ImportError, ImportKind};
use crate::services::spreadsheet::Sheet;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/upload-grades", post(upload_grades))
        .route("/upload-attendance", post(upload_attendance))
        .route("/upload-students", post(upload_students))
}

async fn upload_grades(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<RecordImportResponse>), ApiError> {
    ensure_may_upload(ImportKind::Grades, user.role)?;
    let sheet = read_sheet(&state, &mut multipart).await?;
    let store = PgImportStore::new(state.db().clone());
    let summary = imports::grades::import(&store, &principal(&user), &sheet).await?;

    log_summary(ImportKind::Grades, &user.id, summary.processed(), summary.skipped());
    Ok((StatusCode::CREATED, Json(RecordImportResponse::from_summary("Grades", summary))))
}

async fn upload_attendance(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<RecordImportResponse>), ApiError> {
    ensure_may_upload(ImportKind::Attendance, user.role)?;
    let sheet = read_sheet(&state, &mut multipart).await?;
    let store = PgImportStore::new(state.db().clone());
    let summary = imports::attendance::import(&store, &principal(&user), &sheet).await?;

    log_summary(ImportKind::Attendance, &user.id, summary.processed(), summary.skipped());
    Ok((StatusCode::CREATED, Json(RecordImportResponse::from_summary("Attendance", summary))))
}

async fn upload_students(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<RosterImportResponse>), ApiError> {
    ensure_may_upload(ImportKind::Roster, user.role)?;
    let sheet = read_sheet(&state, &mut multipart).await?;
    let store = PgImportStore::new(state.db().clone());
    let summary = imports::roster::import(&store, &principal(&user), &sheet).await?;

    log_summary(ImportKind::Roster, &user.id, summary.processed(), summary.skipped());
    Ok((StatusCode::CREATED, Json(RosterImportResponse::from_summary(summary))))
}

/// Role check before the upload is read. Course assignments are checked per row later.
fn ensure_may_upload(kind: ImportKind, role: UserRole) -> Result<(), ApiError> {
    let allowed = match kind {
        ImportKind::Grades | ImportKind::Attendance => course_scope(role) != CourseScope::NoCourses,
        ImportKind::Roster => can_manage_students(role),
    };
    if allowed {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!("Not allowed to upload {}", kind.as_str())))
    }
}

async fn read_sheet(state: &AppState, multipart: &mut Multipart) -> Result<Sheet, ApiError> {
    let form = UploadForm::read(multipart, state.settings().storage().max_upload_bytes()).await?;
    let file = form.into_file()?;
    validate_spreadsheet_upload(&file.filename)?;

    let max_rows = state.settings().academic().import_max_rows;
    let bytes = file.bytes;
    // Workbook decoding is CPU-bound; keep it off the async workers.
    let parsed = tokio::task::spawn_blocking(move || Sheet::from_bytes(bytes, max_rows))
        .await
        .map_err(|e| ApiError::internal(e, "Spreadsheet parser task failed"))?;
    parsed.map_err(|err| ImportError::Schema(err).into())
}

fn log_summary(kind: ImportKind, user_id: &str, processed: usize, skipped: usize) {
    tracing::info!(kind = kind.as_str(), user_id, processed, skipped, "Spreadsheet import finished");
}
