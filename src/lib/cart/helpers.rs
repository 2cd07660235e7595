use std::{cmp::Ordering, fs::File, io::BufReader, path::Path, sync::LazyLock};

use log::{debug, info};
use regex::Regex;
use reqwest::{Client, Response};

use super::{
    error::ApiError,
    models::{
        api_model::{LessonRecord, OrderItem, OrderRequest, OrderResponse, SpaceUpdate},
        CartLine, Lesson, ListQuery, SortKey, SortOrder,
    },
};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("name pattern is valid"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern is valid"));

pub const DEFAULT_ICON: &str = "fas fa-book";

/* keyword -> icon, first match wins */
const SUBJECT_ICONS: [(&str, &str); 6] = [
    ("math", "fas fa-calculator"),
    ("science", "fas fa-flask"),
    ("chem", "fas fa-flask"),
    ("music", "fas fa-music"),
    ("chess", "fas fa-chess"),
    ("business", "fas fa-briefcase"),
];

pub fn icon_for_subject(subject: &str) -> &'static str {
    let subject = subject.to_lowercase();
    SUBJECT_ICONS
        .iter()
        .find(|(keyword, _)| subject.contains(keyword))
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_ICON)
}

pub fn log_all_lessons(lessons: &[Lesson]) -> () {
    for lesson in lessons.iter() {
        debug!(
            "Lesson {} ({}) in {}: {} spaces at {}",
            lesson.id, lesson.subject, lesson.location, lesson.spaces, lesson.price
        );
    }
}

fn compare_lessons(a: &Lesson, b: &Lesson, key: SortKey) -> Ordering {
    match key {
        SortKey::Subject => a.subject.to_lowercase().cmp(&b.subject.to_lowercase()),
        SortKey::Location => a.location.to_lowercase().cmp(&b.location.to_lowercase()),
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::Spaces => a.spaces.cmp(&b.spaces),
    }
}

/// Lessons whose subject contains `query.search_text` (ignoring case), stably sorted
/// by `query.sort_key`. Equal keys keep their catalog order in both directions.
pub fn filter_and_sort_lessons<'a>(lessons: &'a [Lesson], query: &ListQuery) -> Vec<&'a Lesson> {
    let needle = query.search_text.to_lowercase();
    let mut shown = lessons
        .iter()
        .filter(|lesson| lesson.subject.to_lowercase().contains(&needle))
        .collect::<Vec<_>>();

    shown.sort_by(|a, b| {
        let ordering = compare_lessons(a, b, query.sort_key);
        match query.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    shown
}

pub fn is_valid_customer_name(name: &str) -> bool {
    NAME_RE.is_match(name.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

pub fn is_checkout_valid(cart: &[CartLine], name: &str, phone: &str) -> bool {
    !cart.is_empty() && is_valid_customer_name(name) && is_valid_phone(phone)
}

pub fn total_cart_items(cart: &[CartLine]) -> u32 {
    cart.iter().map(|line| line.quantity).sum()
}

pub fn total_cart_price(cart: &[CartLine]) -> f64 {
    cart.iter()
        .map(|line| line.price * f64::from(line.quantity))
        .sum()
}

pub fn build_order_request(cart: &[CartLine], name: &str, phone: &str) -> OrderRequest {
    OrderRequest {
        name: name.trim().to_owned(),
        phone_number: phone.trim().to_owned(),
        items: cart
            .iter()
            .map(|line| OrderItem {
                lesson_id: line.lesson_id.clone(),
                quantity: line.quantity,
            })
            .collect(),
    }
}

pub fn get_lessons_from_file(path: &Path) -> Result<Vec<LessonRecord>, ApiError> {
    info!(
        "Reading lessons from {}",
        std::path::absolute(path)?.display()
    );
    let lessons_file = BufReader::new(File::open(path)?);
    let lessons: Vec<LessonRecord> = serde_json::from_reader(lessons_file)?;
    Ok(lessons)
}

/* turn a non-success status into ApiError::Rejected, using {error} from the body if present */
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<OrderResponse>(&body)
        .ok()
        .and_then(|parsed| parsed.error)
        .unwrap_or_default();
    Err(ApiError::Rejected {
        status: status.as_u16(),
        message,
    })
}

pub async fn get_lessons(
    http_client: &Client,
    base_url: &str,
) -> Result<Vec<LessonRecord>, ApiError> {
    info!("Getting all lessons");
    let request_url = format!("{}/lessons", base_url);
    let response = check_status(http_client.get(request_url).send().await?).await?;
    Ok(response.json().await?)
}

pub async fn search_lessons(
    http_client: &Client,
    base_url: &str,
    query: &str,
) -> Result<Vec<LessonRecord>, ApiError> {
    info!("Searching lessons for {:?}", query);
    let request_url = format!("{}/search", base_url);
    let response = http_client
        .get(request_url)
        .query(&[("q", query)])
        .send()
        .await?;
    let response = check_status(response).await?;
    Ok(response.json().await?)
}

pub async fn post_order(
    http_client: &Client,
    base_url: &str,
    order: &OrderRequest,
) -> Result<OrderResponse, ApiError> {
    info!(
        "Posting order for {} with {} item(s)",
        order.name,
        order.items.len()
    );
    let request_url = format!("{}/orders", base_url);
    let response = http_client.post(request_url).json(order).send().await?;
    let status = response.status().as_u16();
    let body = check_status(response).await?.text().await?;
    /* the order is accepted at this point, whatever the body looks like */
    let response: OrderResponse = serde_json::from_str(&body).unwrap_or_else(|err| {
        debug!("Order response body is not an object ({}), ignoring it", err);
        OrderResponse::default()
    });
    match response.error {
        Some(message) => Err(ApiError::Rejected { status, message }),
        None => Ok(response),
    }
}

pub async fn put_lesson_space(
    http_client: &Client,
    base_url: &str,
    lesson_id: &str,
    space: u32,
) -> Result<(), ApiError> {
    debug!("Setting space of lesson {} to {}", lesson_id, space);
    let request_url = format!("{}/lessons/{}", base_url, lesson_id);
    let response = http_client
        .put(request_url)
        .json(&SpaceUpdate { space })
        .send()
        .await?;
    check_status(response).await?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
