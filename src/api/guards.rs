use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::services::authorization;
use crate::services::imports::Principal;

pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentAdmin(pub(crate) User);
/// Admin or staff affairs.
pub(crate) struct CurrentStaff(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        match user {
            Some(user) if user.is_active => Ok(CurrentUser(user)),
            Some(_) => Err(ApiError::Unauthorized("Invalid authentication credentials")),
            None => Err(ApiError::Unauthorized("User not found")),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        match user.role {
            UserRole::Admin => Ok(CurrentAdmin(user)),
            UserRole::StaffAffairs | UserRole::Doctor | UserRole::Student => {
                Err(ApiError::forbidden("Admin access required"))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStaff {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if authorization::can_manage_students(user.role) {
            Ok(CurrentStaff(user))
        } else {
            Err(ApiError::forbidden("Staff access required"))
        }
    }
}

pub(crate) fn principal(user: &User) -> Principal {
    Principal { id: user.id.clone(), role: user.role }
}

/// Course-scoped write access: staff everywhere, doctors through a teaching assignment.
pub(crate) async fn require_course_access(
    state: &AppState,
    user: &User,
    course_id: &str,
) -> Result<(), ApiError> {
    let allowed = authorization::can_manage_course(state.db(), &user.id, user.role, course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check teaching assignment"))?;

    if allowed {
        Ok(())
    } else {
        Err(ApiError::forbidden("You are not assigned to this course"))
    }
}

pub(crate) fn require_student(user: &User) -> Result<(), ApiError> {
    match user.role {
        UserRole::Student => Ok(()),
        UserRole::Doctor | UserRole::StaffAffairs | UserRole::Admin => {
            Err(ApiError::forbidden("Only students have personal records"))
        }
    }
}
