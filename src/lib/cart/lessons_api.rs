use reqwest::Client;

use super::{
    error::ApiError,
    helpers::{get_lessons, post_order, put_lesson_space, search_lessons},
    models::api_model::{LessonRecord, OrderRequest, OrderResponse},
};

/// A trait, necessary for every backend the catalog can be loaded from and orders can be sent to.
#[allow(async_fn_in_trait)]
pub trait LessonsApi {
    async fn fetch_lessons(&self) -> Result<Vec<LessonRecord>, ApiError>;
    async fn search_lessons(&self, query: &str) -> Result<Vec<LessonRecord>, ApiError>;
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResponse, ApiError>;
    async fn update_lesson_space(&self, lesson_id: &str, space: u32) -> Result<(), ApiError>;
}

/// Talks to the lessons backend over HTTP.
pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(http_client: Client, base_url: &str) -> Self {
        ApiClient {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl LessonsApi for ApiClient {
    async fn fetch_lessons(&self) -> Result<Vec<LessonRecord>, ApiError> {
        get_lessons(&self.http_client, &self.base_url).await
    }

    async fn search_lessons(&self, query: &str) -> Result<Vec<LessonRecord>, ApiError> {
        search_lessons(&self.http_client, &self.base_url, query).await
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResponse, ApiError> {
        post_order(&self.http_client, &self.base_url, order).await
    }

    async fn update_lesson_space(&self, lesson_id: &str, space: u32) -> Result<(), ApiError> {
        put_lesson_space(&self.http_client, &self.base_url, lesson_id, space).await
    }
}
