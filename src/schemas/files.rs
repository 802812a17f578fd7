use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::{Certificate, Material};

#[derive(Debug, Serialize)]
pub(crate) struct MaterialResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) content_type: String,
    pub(crate) file_size: i64,
    pub(crate) uploaded_at: String,
    pub(crate) download_url: String,
}

impl MaterialResponse {
    pub(crate) fn from_db(material: Material, api_prefix: &str) -> Self {
        let download_url = format!("{api_prefix}/material/{}/file", material.id);
        Self {
            id: material.id,
            course_id: material.course_id,
            title: material.title,
            content_type: material.content_type,
            file_size: material.file_size,
            uploaded_at: format_primitive(material.uploaded_at),
            download_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CertificateResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) uploaded_at: String,
}

impl CertificateResponse {
    pub(crate) fn from_db(certificate: Certificate) -> Self {
        Self {
            id: certificate.id,
            student_id: certificate.student_id,
            uploaded_at: format_primitive(certificate.uploaded_at),
        }
    }
}
