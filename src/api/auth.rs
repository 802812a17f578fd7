use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::repositories;
use crate::schemas::auth::{PasswordChange, TokenRequest, TokenResponse};
use crate::schemas::user::UserResponse;

/// Max token attempts per username and window.
const AUTH_RATE_LIMIT: u64 = 10;
/// Rate limit window in seconds.
const AUTH_RATE_WINDOW_SECONDS: u64 = 60;

const BAD_CREDENTIALS: &str = "Incorrect username or password";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/token", post(token))
        .route("/auth/password", post(change_password))
        .route("/users/me", get(me))
}

async fn token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let rate_key = format!("rl:token:{}", payload.username.trim().to_lowercase());
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many login attempts, try again later"));
    }

    let user = repositories::users::find_by_username(state.db(), &payload.username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or(ApiError::Unauthorized(BAD_CREDENTIALS))?;

    // Imported students have no password until staff issue a one-time one.
    let Some(hash) = user.hashed_password.as_deref() else {
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
    };
    let verified = security::verify_password(&payload.password, hash)
        .map_err(|_| ApiError::Unauthorized(BAD_CREDENTIALS))?;
    if !verified {
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
    }

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    let token = security::create_access_token(&user.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    tracing::info!(user_id = %user.id, role = %user.role, "Issued access token");

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        role: user.role,
        username: user.username,
        must_reset_password: user.must_reset_password,
    }))
}

async fn change_password(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<PasswordChange>,
) -> Result<StatusCode, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    check_current_password(&user, payload.current_password.as_deref())?;

    let hashed = security::hash_password(&payload.new_password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    repositories::users::set_password(state.db(), &user.id, &hashed, false, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update password"))?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// A user with a stored password must prove it. Only a pending reset with no
/// password at all skips the check.
fn check_current_password(user: &User, current: Option<&str>) -> Result<(), ApiError> {
    let Some(hash) = user.hashed_password.as_deref() else {
        return if user.must_reset_password {
            Ok(())
        } else {
            Err(ApiError::BadRequest("Password change is not available".to_string()))
        };
    };

    let current = current
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest("current_password is required".to_string()))?;
    let verified = security::verify_password(current, hash)
        .map_err(|e| ApiError::internal(e, "Failed to verify password"))?;
    if verified {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Current password is incorrect".to_string()))
    }
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}
