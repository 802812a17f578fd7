use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::News;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct NewsCreate {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub(crate) title: String,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub(crate) content: String,
    #[serde(default = "default_public")]
    pub(crate) is_public: bool,
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub(crate) struct NewsResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) is_public: bool,
    pub(crate) created_at: String,
}

impl NewsResponse {
    pub(crate) fn from_db(news: News) -> Self {
        Self {
            id: news.id,
            title: news.title,
            content: news.content,
            is_public: news.is_public,
            created_at: format_primitive(news.created_at),
        }
    }
}
