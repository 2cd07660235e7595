pub mod error;
pub mod helpers;
pub mod lessons_api;
pub mod local_api;
pub mod models;
pub mod notifier;
pub mod run_tool;
pub mod view_model;
