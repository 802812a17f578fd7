use std::collections::HashMap;

use axum::extract::Multipart;

use crate::api::errors::ApiError;

pub(crate) struct UploadedFile {
    pub(crate) filename: String,
    pub(crate) bytes: Vec<u8>,
}

/// A multipart body with one `file` part and any number of short text fields.
pub(crate) struct UploadForm {
    file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub(crate) async fn read(multipart: &mut Multipart, max_bytes: u64) -> Result<Self, ApiError> {
        let mut file = None;
        let mut fields = HashMap::new();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == "file" {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
                {
                    if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                        return Err(ApiError::PayloadTooLarge(format!(
                            "File size exceeds {}MB limit",
                            max_bytes / (1024 * 1024)
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                file = Some(UploadedFile { filename, bytes });
            } else if !name.is_empty() {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest(format!("Invalid form field '{name}'")))?;
                fields.insert(name, text.trim().to_string());
            }
        }

        Ok(Self { file, fields })
    }

    pub(crate) fn text(&self, name: &str) -> Result<&str, ApiError> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))
    }

    pub(crate) fn into_file(self) -> Result<UploadedFile, ApiError> {
        let file = self.file.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;
        if file.bytes.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }
        Ok(file)
    }
}
