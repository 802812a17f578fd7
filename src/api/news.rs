use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::news::{NewsCreate, NewsResponse};
use crate::services::authorization::can_publish_news;

const NEWS_PAGE_SIZE: i64 = 50;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/news", get(list_news).post(create_news))
}

async fn list_news(State(state): State<AppState>) -> Result<Json<Vec<NewsResponse>>, ApiError> {
    let items = repositories::news::list_public(state.db(), NEWS_PAGE_SIZE)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list news"))?;
    Ok(Json(items.into_iter().map(NewsResponse::from_db).collect()))
}

async fn create_news(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<NewsCreate>,
) -> Result<(StatusCode, Json<NewsResponse>), ApiError> {
    if !can_publish_news(user.role) {
        return Err(ApiError::forbidden("Staff access required"));
    }
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let news = repositories::news::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        payload.title.trim(),
        &payload.content,
        payload.is_public,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create news"))?;

    Ok((StatusCode::CREATED, Json(NewsResponse::from_db(news))))
}
