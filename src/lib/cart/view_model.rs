use std::time::Duration;

use futures::future;
use log::{debug, error, info, warn};
use tokio::{sync::oneshot, task::JoinHandle};

use super::{
    error::CheckoutError,
    helpers::{
        build_order_request, filter_and_sort_lessons, is_checkout_valid, log_all_lessons,
        total_cart_items, total_cart_price,
    },
    lessons_api::LessonsApi,
    models::{
        api_model::{LessonRecord, OrderResponse},
        CartLine, CheckoutState, Config, Lesson, ListQuery, SortKey, SortOrder,
    },
    notifier::Notifier,
};

/// A reset of the cart scheduled to happen after the order confirmation has been shown.
/// The task is aborted when the handle is cancelled or dropped.
pub struct PendingReset {
    fired: oneshot::Receiver<()>,
    handle: JoinHandle<()>,
}

impl PendingReset {
    pub fn schedule(delay: Duration) -> Self {
        let (tx, fired) = oneshot::channel();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(());
        });
        PendingReset { fired, handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for PendingReset {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// State of the lessons page: the catalog, the cart and the checkout form.
///
/// Everything is owned by one task and changed through `&mut self`, the backend
/// and the customer-facing alerts are reached through `A` and `N`.
pub struct CatalogViewModel<A: LessonsApi, N: Notifier> {
    api: A,
    notifier: N,
    lessons: Vec<Lesson>,
    cart: Vec<CartLine>,
    query: ListQuery,
    customer_name: String,
    customer_phone: String,
    show_cart: bool,
    confirmation: Option<String>,
    checkout_state: CheckoutState,
    confirmation_delay: Duration,
    pending_reset: Option<PendingReset>,
}

impl<A: LessonsApi, N: Notifier> CatalogViewModel<A, N> {
    pub fn new(api: A, notifier: N, config: &Config) -> Self {
        CatalogViewModel {
            api,
            notifier,
            lessons: Vec::new(),
            cart: Vec::new(),
            query: ListQuery::default(),
            customer_name: String::new(),
            customer_phone: String::new(),
            show_cart: false,
            confirmation: None,
            checkout_state: CheckoutState::Idle,
            confirmation_delay: Duration::from_millis(config.confirmation_delay_ms),
            pending_reset: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id == lesson_id)
    }

    pub fn cart(&self) -> &[CartLine] {
        &self.cart
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn customer_phone(&self) -> &str {
        &self.customer_phone
    }

    pub fn is_cart_shown(&self) -> bool {
        self.show_cart
    }

    pub fn confirmation(&self) -> Option<&str> {
        self.confirmation.as_deref()
    }

    pub fn checkout_state(&self) -> CheckoutState {
        self.checkout_state
    }

    pub fn has_pending_reset(&self) -> bool {
        self.pending_reset.is_some()
    }

    fn replace_catalog(&mut self, records: Vec<LessonRecord>) {
        self.lessons = records.into_iter().map(Lesson::from).collect();
        log_all_lessons(&self.lessons);
    }

    /// Replaces the catalog with everything the backend has. Failures are only logged.
    pub async fn load(&mut self) {
        match self.api.fetch_lessons().await {
            Ok(records) => {
                info!("Loaded {} lessons", records.len());
                self.replace_catalog(records);
            }
            Err(err) => error!("Failed to load lessons: {}", err),
        }
    }

    /// Replaces the catalog with what the backend matches for `query`. Failures are only logged.
    pub async fn search(&mut self, query: &str) {
        match self.api.search_lessons(query).await {
            Ok(records) => {
                info!("Search for {:?} found {} lessons", query, records.len());
                self.replace_catalog(records);
            }
            Err(err) => error!("Failed to search lessons for {:?}: {}", query, err),
        }
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.query.search_text = text.to_owned();
    }

    pub fn set_sort(&mut self, key: SortKey, order: SortOrder) {
        self.query.sort_key = key;
        self.query.sort_order = order;
    }

    pub fn filtered_lessons(&self) -> Vec<&Lesson> {
        filter_and_sort_lessons(&self.lessons, &self.query)
    }

    /// Reserves one space of the lesson. Returns `false` and changes nothing
    /// when the lesson is unknown or full.
    pub fn add_to_cart(&mut self, lesson_id: &str) -> bool {
        let Some(lesson) = self
            .lessons
            .iter_mut()
            .find(|lesson| lesson.id == lesson_id)
        else {
            debug!("Lesson {} is not in the catalog", lesson_id);
            return false;
        };
        if lesson.spaces == 0 {
            debug!("Lesson {} has no spaces left", lesson_id);
            return false;
        }

        lesson.spaces -= 1;
        match self.cart.iter_mut().find(|line| line.lesson_id == lesson_id) {
            Some(line) => line.quantity += 1,
            None => self.cart.push(CartLine::for_lesson(lesson)),
        }
        debug!("Added lesson {}, {} spaces left", lesson_id, lesson.spaces);
        true
    }

    /// Drops the whole cart line and gives its spaces back to the lesson.
    pub fn remove_from_cart(&mut self, lesson_id: &str) -> bool {
        let Some(index) = self
            .cart
            .iter()
            .position(|line| line.lesson_id == lesson_id)
        else {
            return false;
        };
        let line = self.cart.remove(index);

        match self
            .lessons
            .iter_mut()
            .find(|lesson| lesson.id == lesson_id)
        {
            Some(lesson) => lesson.spaces += line.quantity,
            None => warn!(
                "Lesson {} is no longer in the catalog, {} space(s) not restored",
                lesson_id, line.quantity
            ),
        }
        true
    }

    pub fn toggle_cart(&mut self) -> bool {
        self.show_cart = !self.show_cart;
        self.show_cart
    }

    pub fn set_customer_name(&mut self, name: &str) {
        self.customer_name = name.to_owned();
    }

    pub fn set_customer_phone(&mut self, phone: &str) {
        self.customer_phone = phone.to_owned();
    }

    pub fn is_checkout_valid(&self) -> bool {
        is_checkout_valid(&self.cart, &self.customer_name, &self.customer_phone)
    }

    pub fn total_cart_items(&self) -> u32 {
        total_cart_items(&self.cart)
    }

    pub fn total_cart_price(&self) -> f64 {
        total_cart_price(&self.cart)
    }

    fn fail_checkout(&mut self, err: CheckoutError) -> Result<OrderResponse, CheckoutError> {
        self.checkout_state = CheckoutState::Idle;
        self.notifier.alert(&err.user_message());
        Err(err)
    }

    /// Sends the cart as an order. On success the new space counts are written
    /// back, the confirmation is shown and a reset of the cart is scheduled.
    /// Nothing stops a second submission while the confirmation is still shown.
    pub async fn submit_order(&mut self) -> Result<OrderResponse, CheckoutError> {
        self.checkout_state = CheckoutState::Validating;
        if !self.is_checkout_valid() {
            return self.fail_checkout(CheckoutError::Invalid);
        }

        self.checkout_state = CheckoutState::Submitting;
        let order = build_order_request(&self.cart, &self.customer_name, &self.customer_phone);
        let response = match self.api.place_order(&order).await {
            Ok(response) => response,
            Err(err) => {
                error!("Failed to place order for {}: {}", order.name, err);
                return self.fail_checkout(err.into());
            }
        };
        info!(
            "Order placed for {}: {} item(s), total {}",
            order.name,
            self.total_cart_items(),
            self.total_cart_price()
        );

        self.write_back_spaces().await;

        self.confirmation = Some(format!(
            "Order submitted successfully! Thank you, {}.",
            order.name
        ));
        self.checkout_state = CheckoutState::Confirming;
        self.pending_reset = Some(PendingReset::schedule(self.confirmation_delay));
        Ok(response)
    }

    /* one independent write per cart line; failures are logged and left alone */
    async fn write_back_spaces(&self) {
        let updates = self
            .cart
            .iter()
            .filter_map(|line| match self.lesson(&line.lesson_id) {
                Some(lesson) => Some((lesson.id.as_str(), lesson.spaces)),
                None => {
                    warn!(
                        "Lesson {} is no longer in the catalog, space not written back",
                        line.lesson_id
                    );
                    None
                }
            })
            .collect::<Vec<_>>();

        let results = future::join_all(
            updates
                .iter()
                .map(|(lesson_id, space)| self.api.update_lesson_space(lesson_id, *space)),
        )
        .await;

        for ((lesson_id, space), result) in updates.iter().zip(results) {
            match result {
                Ok(()) => debug!("Lesson {} now has {} spaces", lesson_id, space),
                Err(err) => warn!("Failed to update space of lesson {}: {}", lesson_id, err),
            }
        }
    }

    fn reset_after_confirmation(&mut self) {
        info!("Clearing cart after confirmation");
        self.cart.clear();
        self.customer_name.clear();
        self.customer_phone.clear();
        self.confirmation = None;
        self.show_cart = false;
        self.checkout_state = CheckoutState::Idle;
    }

    /// Resolves once the scheduled reset has fired and been applied. Never
    /// resolves when nothing is scheduled, so it can sit in a `select!` loop.
    pub async fn wait_for_reset(&mut self) {
        let Some(pending) = self.pending_reset.as_mut() else {
            return future::pending().await;
        };
        let fired = (&mut pending.fired).await.is_ok();
        self.pending_reset = None;
        if fired {
            self.reset_after_confirmation();
        }
    }

    /// Cancels the scheduled reset, if any. Call when the view goes away.
    pub fn teardown(&mut self) {
        if let Some(pending) = self.pending_reset.take() {
            debug!("Cancelling scheduled cart reset");
            pending.cancel();
        }
    }
}
