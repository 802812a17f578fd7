use std::path::{Component, Path, PathBuf};

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("invalid storage key")]
    InvalidKey,
    #[error("object not found")]
    NotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("object storage error: {0}")]
    Remote(String),
}

#[derive(Debug, Clone)]
pub(crate) struct StoredObject {
    pub(crate) key: String,
    pub(crate) size: i64,
    pub(crate) sha256: String,
}

/// Blob storage for uploaded materials and certificates.
#[derive(Debug, Clone)]
pub(crate) enum StorageService {
    Local { root: PathBuf },
    S3 { client: Client, bucket: String },
}

impl StorageService {
    /// S3 when credentials are configured, otherwise the local media directory.
    pub(crate) async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let s3 = settings.s3();
        if !s3.is_configured() {
            return Ok(Self::local(&settings.storage().media_root));
        }

        let creds = Credentials::new(
            s3.access_key.clone(),
            s3.secret_key.clone(),
            None,
            None,
            "bsu-portal-static",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(s3.endpoint.clone())
            .region(aws_config::Region::new(s3.region.clone()))
            .credentials_provider(creds)
            .load()
            .await;

        // Path-style addressing keeps MinIO and other S3-compatible endpoints working.
        let s3_config = aws_sdk_s3::config::Builder::from(&config).force_path_style(true).build();
        Ok(Self::S3 { client: Client::from_conf(s3_config), bucket: s3.bucket.clone() })
    }

    pub(crate) fn local(root: impl Into<PathBuf>) -> Self {
        Self::Local { root: root.into() }
    }

    pub(crate) fn backend_name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::S3 { .. } => "s3",
        }
    }

    pub(crate) async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        let relative = sanitize_key(key)?;
        let size = bytes.len() as i64;
        let sha256 = hex::encode(Sha256::digest(&bytes));

        match self {
            Self::Local { root } => {
                let path = root.join(&relative);
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, bytes).await?;
            }
            Self::S3 { client, bucket } => {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(key)
                    .content_type(content_type)
                    .body(ByteStream::from(bytes))
                    .send()
                    .await
                    .map_err(|err| StorageError::Remote(err.to_string()))?;
            }
        }

        metrics::counter!("storage_writes_total", "backend" => self.backend_name()).increment(1);
        Ok(StoredObject { key: key.to_string(), size, sha256 })
    }

    pub(crate) async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let relative = sanitize_key(key)?;
        match self {
            Self::Local { root } => match tokio::fs::read(root.join(relative)).await {
                Ok(bytes) => Ok(bytes),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
                Err(err) => Err(err.into()),
            },
            Self::S3 { client, bucket } => {
                let object = client
                    .get_object()
                    .bucket(bucket)
                    .key(key)
                    .send()
                    .await
                    .map_err(|err| {
                        if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                            StorageError::NotFound
                        } else {
                            StorageError::Remote(err.to_string())
                        }
                    })?;
                let body = object
                    .body
                    .collect()
                    .await
                    .map_err(|err| StorageError::Remote(err.to_string()))?;
                Ok(body.into_bytes().to_vec())
            }
        }
    }

    /// Deleting a missing object succeeds.
    pub(crate) async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let relative = sanitize_key(key)?;
        match self {
            Self::Local { root } => match tokio::fs::remove_file(root.join(relative)).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            },
            Self::S3 { client, bucket } => {
                client
                    .delete_object()
                    .bucket(bucket)
                    .key(key)
                    .send()
                    .await
                    .map_err(|err| StorageError::Remote(err.to_string()))?;
                Ok(())
            }
        }
    }
}

/// Server-assigned key: `{prefix}/{uuid}_{sanitized file name}`.
pub(crate) fn object_key(prefix: &str, filename: &str) -> String {
    let name: String = Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("file")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let name = if name.trim_matches('.').is_empty() { "file".to_string() } else { name };
    format!("{prefix}/{}_{name}", Uuid::new_v4().simple())
}

pub(crate) fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub(crate) fn guess_mime(filename: &str) -> &'static str {
    match file_extension(filename).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("zip") => "application/zip",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

fn sanitize_key(raw: &str) -> Result<PathBuf, StorageError> {
    let normalized = raw.trim().trim_start_matches('/');
    if normalized.is_empty() || normalized.contains('\\') {
        return Err(StorageError::InvalidKey);
    }

    let path = Path::new(normalized);
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::InvalidKey);
            }
        }
    }

    Ok(path.to_path_buf())
}
