pub const PRODUCTS_FETCH_FAILED: &str = "Failed to fetch products";
pub const REVIEWS_FETCH_FAILED: &str = "Failed to fetch reviews";
pub const ORDER_SUBMIT_FAILED: &str = "Ошибка при отправке заказа";

/// Failures of a [`ShopApi`](crate::ShopApi) call.
///
/// The `Display` text of `Fetch` and `Submission` is the message shown to
/// the visitor.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A catalog or review load was answered with a non-success status.
    #[error("{0}")]
    Fetch(String),

    /// The order endpoint answered with a non-success status.
    #[error("{0}")]
    Submission(String),

    #[error("Failed to fetch: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn products_unavailable() -> Self {
        Self::Fetch(PRODUCTS_FETCH_FAILED.to_owned())
    }

    pub fn reviews_unavailable() -> Self {
        Self::Fetch(REVIEWS_FETCH_FAILED.to_owned())
    }

    pub fn order_rejected() -> Self {
        Self::Submission(ORDER_SUBMIT_FAILED.to_owned())
    }
}
