use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Please add a lesson to the cart and enter a valid name (letters only) and a 10 digit phone number.")]
    Invalid,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Text shown to the customer: the backend's own message when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Invalid => self.to_string(),
            CheckoutError::Api(ApiError::Rejected { message, .. }) if !message.is_empty() => {
                message.clone()
            }
            CheckoutError::Api(_) => GENERIC_ORDER_FAILURE.to_owned(),
        }
    }
}

pub const GENERIC_ORDER_FAILURE: &str = "Failed to place order. Please try again.";
