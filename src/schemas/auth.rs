use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::types::UserRole;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TokenRequest {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub(crate) username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) role: UserRole,
    pub(crate) username: String,
    pub(crate) must_reset_password: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PasswordChange {
    #[serde(default)]
    pub(crate) current_password: Option<String>,
    #[validate(length(min = 8, message = "new_password must be at least 8 characters long"))]
    pub(crate) new_password: String,
}
