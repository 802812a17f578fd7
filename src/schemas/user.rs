use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories::users::StudentRow;

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) department_id: Option<String>,
    pub(crate) level_id: Option<String>,
    pub(crate) national_id: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) must_reset_password: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            department_id: user.department_id,
            level_id: user.level_id,
            national_id: user.national_id,
            is_active: user.is_active,
            must_reset_password: user.must_reset_password,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentFilter {
    #[serde(default)]
    pub(crate) dept: Option<String>,
    #[serde(default)]
    pub(crate) level: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) national_id: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) must_reset_password: bool,
    pub(crate) department_id: Option<String>,
    pub(crate) department: String,
    pub(crate) level_id: Option<String>,
    pub(crate) level: String,
}

impl StudentResponse {
    pub(crate) fn from_row(row: StudentRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            full_name: row.full_name,
            national_id: row.national_id,
            is_active: row.is_active,
            must_reset_password: row.must_reset_password,
            department_id: row.department_id,
            department: row.department_name.unwrap_or_else(|| "-".to_string()),
            level_id: row.level_id,
            level: row.level_name.unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StudentUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "full_name must not be empty"))]
    pub(crate) full_name: Option<String>,
    #[serde(default)]
    pub(crate) department_id: Option<String>,
    #[serde(default)]
    pub(crate) level_id: Option<String>,
    #[serde(default)]
    pub(crate) national_id: Option<String>,
    #[serde(default)]
    pub(crate) is_active: Option<bool>,
}

/// Returned once, when staff issue a one-time password.
#[derive(Debug, Serialize)]
pub(crate) struct CredentialsResponse {
    pub(crate) username: String,
    pub(crate) one_time_password: String,
    pub(crate) must_reset_password: bool,
}
