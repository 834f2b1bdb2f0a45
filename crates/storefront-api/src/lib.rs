//! Wire contract of the storefront REST service.
//!
//! The state engine talks to the service only through [`ShopApi`]; the
//! [`HttpShopApi`] implementation is the production collaborator and tests
//! substitute their own.

mod client;
mod error;
mod http;
mod models;

pub use client::{ApiFuture, ShopApi};
pub use error::{
    ApiError, ORDER_SUBMIT_FAILED, PRODUCTS_FETCH_FAILED, REVIEWS_FETCH_FAILED,
};
pub use http::{HttpShopApi, DEFAULT_API_BASE};
pub use models::{CatalogPage, OrderLine, OrderRequest, Product, ProductId, Review};
