//! Module with lesson and order models compatible with the lessons backend REST API
use serde::{Deserialize, Serialize};

/// A lesson exactly as `GET /lessons` and `GET /search` return it.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub topic: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub space: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq)]
pub struct OrderItem {
    #[serde(rename = "lessonID")]
    pub lesson_id: String,
    pub quantity: u32,
}

/// Body of `POST /orders`.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub name: String,
    pub phone_number: String,
    pub items: Vec<OrderItem>,
}

/// Body of `POST /orders` response. Anything besides `error` is kept as is.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Default)]
pub struct OrderResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Body of `PUT /lessons/:id`.
#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct SpaceUpdate {
    pub space: u32,
}
