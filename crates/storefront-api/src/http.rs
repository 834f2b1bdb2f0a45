use reqwest::Client;

use crate::client::{ApiFuture, ShopApi};
use crate::error::ApiError;
use crate::models::{CatalogPage, OrderRequest, Review};

pub const DEFAULT_API_BASE: &str = "http://o-complex.com:1337";

/// [`ShopApi`] over HTTP. Transport-level retries are left to `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpShopApi {
    client: Client,
    base_url: String,
}

impl HttpShopApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn products_url(&self, page: u32, page_size: u32) -> String {
        format!(
            "{}/products?page={page}&page_size={page_size}",
            self.base_url
        )
    }

    pub fn reviews_url(&self) -> String {
        format!("{}/reviews", self.base_url)
    }

    pub fn order_url(&self) -> String {
        format!("{}/order", self.base_url)
    }
}

impl Default for HttpShopApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl ShopApi for HttpShopApi {
    fn fetch_products(&self, page: u32, page_size: u32) -> ApiFuture<CatalogPage> {
        let request = self.client.get(self.products_url(page, page_size));
        Box::pin(async move {
            let response = request.send().await?;
            if !response.status().is_success() {
                log::debug!("products page {page} answered {}", response.status());
                return Err(ApiError::products_unavailable());
            }
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        })
    }

    fn fetch_reviews(&self) -> ApiFuture<Vec<Review>> {
        let request = self.client.get(self.reviews_url());
        Box::pin(async move {
            let response = request.send().await?;
            if !response.status().is_success() {
                log::debug!("reviews answered {}", response.status());
                return Err(ApiError::reviews_unavailable());
            }
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        })
    }

    fn submit_order(&self, order: &OrderRequest) -> ApiFuture<()> {
        // `.json()` sets `Content-Type: application/json`.
        let request = self.client.post(self.order_url()).json(order);
        Box::pin(async move {
            let response = request.send().await?;
            if !response.status().is_success() {
                log::debug!("order answered {}", response.status());
                return Err(ApiError::order_rejected());
            }
            Ok(())
        })
    }
}
