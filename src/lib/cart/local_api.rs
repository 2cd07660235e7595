use std::{cell::RefCell, path::Path};

use log::info;

use super::{
    error::ApiError,
    helpers::get_lessons_from_file,
    lessons_api::LessonsApi,
    models::api_model::{LessonRecord, OrderRequest, OrderResponse},
};

/// An in-memory backend seeded from a lessons JSON file. Orders and space
/// updates only live as long as the value does.
#[derive(Debug, Default)]
pub struct LocalLessons {
    lessons: RefCell<Vec<LessonRecord>>,
    orders: RefCell<Vec<OrderRequest>>,
}

impl LocalLessons {
    pub fn new(lessons: Vec<LessonRecord>) -> Self {
        LocalLessons {
            lessons: RefCell::new(lessons),
            orders: RefCell::new(Vec::new()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let lessons = get_lessons_from_file(path)?;
        info!("Seeded local catalog with {} lessons", lessons.len());
        Ok(Self::new(lessons))
    }

    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.borrow().clone()
    }

    pub fn lessons(&self) -> Vec<LessonRecord> {
        self.lessons.borrow().clone()
    }
}

impl LessonsApi for LocalLessons {
    async fn fetch_lessons(&self) -> Result<Vec<LessonRecord>, ApiError> {
        Ok(self.lessons())
    }

    async fn search_lessons(&self, query: &str) -> Result<Vec<LessonRecord>, ApiError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .lessons
            .borrow()
            .iter()
            .filter(|lesson| lesson.topic.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResponse, ApiError> {
        let mut orders = self.orders.borrow_mut();
        orders.push(order.clone());
        let mut response = OrderResponse::default();
        response
            .fields
            .insert("orderNumber".to_owned(), orders.len().into());
        Ok(response)
    }

    async fn update_lesson_space(&self, lesson_id: &str, space: u32) -> Result<(), ApiError> {
        let mut lessons = self.lessons.borrow_mut();
        match lessons.iter_mut().find(|lesson| lesson.id == lesson_id) {
            Some(lesson) => {
                lesson.space = space;
                Ok(())
            }
            None => Err(ApiError::Rejected {
                status: 404,
                message: format!("Lesson {} not found", lesson_id),
            }),
        }
    }
}
