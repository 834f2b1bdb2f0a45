use std::future::Future;
use std::pin::Pin;

use crate::error::ApiError;
use crate::models::{CatalogPage, OrderRequest, Review};

/// Future returned by every [`ShopApi`] call. It is polled on the UI thread,
/// so it need not be `Send`.
pub type ApiFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + 'static>>;

/// The remote shop service.
///
/// Each call issues exactly one request, which the returned future drives
/// to completion.
pub trait ShopApi {
    /// `GET /products?page={page}&page_size={page_size}`.
    fn fetch_products(&self, page: u32, page_size: u32) -> ApiFuture<CatalogPage>;

    /// `GET /reviews`.
    fn fetch_reviews(&self) -> ApiFuture<Vec<Review>>;

    /// `POST /order` with a JSON body.
    fn submit_order(&self, order: &OrderRequest) -> ApiFuture<()>;
}
