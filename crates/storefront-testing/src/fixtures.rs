use storefront_api::{CatalogPage, Product, ProductId};

pub fn product(id: ProductId, price: f64) -> Product {
    Product {
        id,
        image_url: format!("https://cdn.test/{id}.png"),
        title: format!("Product {id}"),
        description: format!("Description of product {id}"),
        price,
    }
}

/// Products `first..first + count`, priced `100 * id`.
pub fn products(first: ProductId, count: u64) -> Vec<Product> {
    (first..first + count)
        .map(|id| product(id, 100.0 * id as f64))
        .collect()
}

pub fn catalog_page(page: u32, items: Vec<Product>) -> CatalogPage {
    CatalogPage {
        page,
        amount: items.len() as u32,
        total: 0,
        items,
    }
}
