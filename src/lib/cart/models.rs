use std::{fmt, path::PathBuf};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use super::helpers::icon_for_subject;
use api_model::LessonRecord;

pub mod api_model;

/// A model for describing a bookable lesson, as the catalog shows it.
/// Consists of:
/// 1. Backend-assigned identifier
/// 2. Subject, location and unit price
/// 3. Remaining spaces, which go down as the lesson is put into the cart
/// 4. Icon class, derived from the subject
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub subject: String,
    pub location: String,
    pub price: f64,
    pub spaces: u32,
    pub icon: String,
    pub image_url: Option<String>,
}

impl From<LessonRecord> for Lesson {
    fn from(record: LessonRecord) -> Self {
        let icon = icon_for_subject(&record.topic).to_owned();
        Lesson {
            id: record.id,
            subject: record.topic,
            location: record.location,
            price: record.price,
            spaces: record.space,
            icon,
            image_url: record.image_url,
        }
    }
}

/// A pending reservation of some spaces of one lesson.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CartLine {
    pub lesson_id: String,
    pub subject: String,
    pub location: String,
    pub price: f64,
    pub icon: String,
    pub quantity: u32,
}

impl CartLine {
    pub fn for_lesson(lesson: &Lesson) -> Self {
        CartLine {
            lesson_id: lesson.id.clone(),
            subject: lesson.subject.clone(),
            location: lesson.location.clone(),
            price: lesson.price,
            icon: lesson.icon.clone(),
            quantity: 1,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Subject,
    Location,
    Price,
    Spaces,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// What part of the catalog is shown and in which order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search_text: String,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
}

/// Where order submission currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Confirming,
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutState::Idle => "idle",
            CheckoutState::Validating => "validating",
            CheckoutState::Submitting => "submitting",
            CheckoutState::Confirming => "confirming",
        };
        f.write_str(name)
    }
}

/// A model for describing ARGS of the tool.
/// Consists of:
/// 1. Path to config.json, that contains the backend address and the confirmation delay.
/// 2. Optional path to a lessons JSON file. When given, the tool works against an in-memory catalog seeded from it instead of the backend.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    pub config_json_path: PathBuf,
    #[arg(long, value_name = "FILE")]
    pub lessons_json_path: Option<PathBuf>,
}

/// A model for describing configuration of the tool.
/// Consists of:
/// 1. Base URL of the lessons API, e.g. `http://localhost:3000/api`
/// 2. How long the order confirmation stays on screen before the cart is reset, in milliseconds
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_confirmation_delay_ms")]
    pub confirmation_delay_ms: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:3000/api".to_owned()
}

fn default_confirmation_delay_ms() -> u64 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: default_api_base_url(),
            confirmation_delay_ms: default_confirmation_delay_ms(),
        }
    }
}
