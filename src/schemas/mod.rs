use std::collections::HashMap;

use serde::Serialize;

pub(crate) mod auth;
pub(crate) mod catalog;
pub(crate) mod files;
pub(crate) mod imports;
pub(crate) mod news;
pub(crate) mod records;
pub(crate) mod user;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) api_prefix: String,
}
