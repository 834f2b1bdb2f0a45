use serde::{Deserialize, Serialize};

pub type ProductId = u64;

/// A catalog product. Immutable once received and identified solely by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub image_url: String,
    pub title: String,
    pub description: String,
    pub price: f64,
}

/// One `GET /products` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub page: u32,
    pub amount: u32,
    pub total: u32,
    pub items: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    /// HTML fragment as delivered by the service.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub phone: String,
    pub cart: Vec<OrderLine>,
}
