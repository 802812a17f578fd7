use crate::api::errors::ApiError;
use crate::services::storage::file_extension;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

pub(crate) fn validate_document_upload(
    filename: &str,
    allowed_extensions: &[String],
) -> Result<String, ApiError> {
    let extension = file_extension(filename)
        .ok_or_else(|| ApiError::BadRequest("File must have an extension".to_string()))?;

    if allowed_extensions.iter().any(|allowed| allowed == &extension) {
        Ok(extension)
    } else {
        Err(ApiError::BadRequest(format!("File extension '{extension}' is not allowed")))
    }
}

pub(crate) fn validate_spreadsheet_upload(filename: &str) -> Result<(), ApiError> {
    match file_extension(filename) {
        Some(ext) if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ApiError::BadRequest(
            "Upload an Excel or OpenDocument spreadsheet (.xlsx, .xls, .ods)".to_string(),
        )),
    }
}

pub(crate) fn validate_certificate_upload(filename: &str) -> Result<(), ApiError> {
    match file_extension(filename).as_deref() {
        Some("pdf") => Ok(()),
        _ => Err(ApiError::BadRequest("Certificates must be PDF files".to_string())),
    }
}
