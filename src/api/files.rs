use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_access, require_student, CurrentStaff, CurrentUser};
use crate::api::upload::UploadForm;
use crate::api::validation::{validate_certificate_upload, validate_document_upload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::files::{CertificateResponse, MaterialResponse};
use crate::services::storage::{guess_mime, object_key};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/upload-material", post(upload_material))
        .route("/courses/:course_id/materials", get(list_materials))
        .route("/material/:id", axum::routing::delete(delete_material))
        .route("/material/:id/file", get(download_material))
        .route("/upload-certificate", post(upload_certificate))
        .route("/my-certificate", get(my_certificate))
}

async fn upload_material(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MaterialResponse>), ApiError> {
    let storage_settings = state.settings().storage();
    let form = UploadForm::read(&mut multipart, storage_settings.max_upload_bytes()).await?;
    let course_id = form.text("course_id")?.to_string();
    let title = form.text("title")?.to_string();
    let file = form.into_file()?;
    validate_document_upload(&file.filename, &storage_settings.allowed_document_extensions)?;

    repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;
    require_course_access(&state, &user, &course_id).await?;

    let content_type = guess_mime(&file.filename);
    let key = object_key("materials", &file.filename);
    let stored = state.storage().put(&key, content_type, file.bytes).await?;

    let created = repositories::materials::create(
        state.db(),
        repositories::materials::CreateMaterial {
            id: &Uuid::new_v4().to_string(),
            course_id: &course_id,
            title: &title,
            file_key: &stored.key,
            content_type,
            file_size: stored.size,
            uploaded_by: &user.id,
            uploaded_at: primitive_now_utc(),
        },
    )
    .await;
    let material = match created {
        Ok(material) => material,
        Err(err) => {
            discard_blob(&state, &stored.key).await;
            return Err(ApiError::internal(err, "Failed to store material"));
        }
    };

    tracing::info!(
        material_id = %material.id,
        course_id = %course_id,
        size = stored.size,
        sha256 = %stored.sha256,
        "Material uploaded"
    );
    let api_prefix = state.settings().api().api_prefix.clone();
    Ok((StatusCode::CREATED, Json(MaterialResponse::from_db(material, &api_prefix))))
}

async fn list_materials(
    Path(course_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<MaterialResponse>>, ApiError> {
    let materials = repositories::materials::list_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list materials"))?;
    let api_prefix = state.settings().api().api_prefix.clone();
    Ok(Json(
        materials.into_iter().map(|material| MaterialResponse::from_db(material, &api_prefix)).collect(),
    ))
}

async fn download_material(
    Path(id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let material = repositories::materials::find_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load material"))?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))?;

    let bytes = state.storage().get(&material.file_key).await?;
    let filename = material.file_key.rsplit('/').next().unwrap_or("material");
    Ok(file_response(bytes, &material.content_type, filename))
}

async fn delete_material(
    Path(id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let material = repositories::materials::find_by_id(state.db(), &id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load material"))?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))?;
    require_course_access(&state, &user, &material.course_id).await?;

    repositories::materials::delete(state.db(), &material.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete material"))?;
    discard_blob(&state, &material.file_key).await;

    tracing::info!(material_id = %material.id, user_id = %user.id, "Material deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_certificate(
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CertificateResponse>), ApiError> {
    let form =
        UploadForm::read(&mut multipart, state.settings().storage().max_upload_bytes()).await?;
    let username = form.text("student_id")?.to_string();
    let file = form.into_file()?;
    validate_certificate_upload(&file.filename)?;

    let student = repositories::users::find_by_username(state.db(), &username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;
    require_terminal_level(&state, &student).await?;

    let existing = repositories::certificates::find_for_student(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check certificate"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Student already has a certificate".to_string()));
    }

    let key = object_key("certificates", &file.filename);
    let stored = state.storage().put(&key, "application/pdf", file.bytes).await?;
    let created = repositories::certificates::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &student.id,
        &stored.key,
        &staff.id,
        primitive_now_utc(),
    )
    .await;

    let certificate = match created {
        Ok(Some(certificate)) => certificate,
        Ok(None) => {
            discard_blob(&state, &stored.key).await;
            return Err(ApiError::Conflict("Student already has a certificate".to_string()));
        }
        Err(err) => {
            discard_blob(&state, &stored.key).await;
            return Err(ApiError::internal(err, "Failed to store certificate"));
        }
    };

    tracing::info!(student_id = %student.id, staff_id = %staff.id, "Certificate uploaded");
    Ok((StatusCode::CREATED, Json(CertificateResponse::from_db(certificate))))
}

async fn my_certificate(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    require_student(&user)?;
    let certificate = repositories::certificates::find_for_student(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load certificate"))?
        .ok_or_else(|| ApiError::NotFound("No certificate uploaded yet".to_string()))?;

    let bytes = state.storage().get(&certificate.file_key).await?;
    Ok(file_response(bytes, "application/pdf", "certificate.pdf"))
}

async fn require_terminal_level(state: &AppState, student: &User) -> Result<(), ApiError> {
    match student.role {
        UserRole::Student => {}
        UserRole::Doctor | UserRole::StaffAffairs | UserRole::Admin => {
            return Err(ApiError::NotFound("Student not found".to_string()));
        }
    }

    let terminal = &state.settings().academic().terminal_level_name;
    let level = match student.level_id.as_deref() {
        Some(level_id) => repositories::levels::find_by_id(state.db(), level_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load level"))?,
        None => None,
    };

    match level {
        Some(level) if level.name.trim().eq_ignore_ascii_case(terminal.trim()) => Ok(()),
        _ => Err(ApiError::BadRequest(format!(
            "Certificates can only be uploaded for {terminal} students"
        ))),
    }
}

/// Blob cleanup never fails the request; a leftover object is only logged.
async fn discard_blob(state: &AppState, key: &str) {
    if let Err(err) = state.storage().delete(key).await {
        tracing::warn!(error = %err, key, "Failed to delete stored file");
    }
}

fn file_response(bytes: Vec<u8>, content_type: &str, filename: &str) -> Response {
    let mut response = (StatusCode::OK, bytes).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    let disposition = format!("attachment; filename=\"{filename}\"");
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }
    response
}
