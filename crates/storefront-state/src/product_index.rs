use storefront_api::{Product, ProductId};
use storefront_core::map::HashMap;
use storefront_core::{MutableState, State};

/// Shared id → product lookup, the only catalog structure other stores read.
///
/// Merges are last-write-wins per id. Clones share the same map.
#[derive(Clone)]
pub struct ProductIndex {
    products: MutableState<HashMap<ProductId, Product>>,
}

impl ProductIndex {
    pub fn new() -> Self {
        Self {
            products: MutableState::new(HashMap::new()),
        }
    }

    pub fn merge(&self, items: &[Product]) {
        if items.is_empty() {
            return;
        }
        self.products.update(|products| {
            for item in items {
                products.insert(item.id, item.clone());
            }
        });
    }

    pub fn get(&self, id: ProductId) -> Option<Product> {
        self.products.with(|products| products.get(&id).cloned())
    }

    pub fn price(&self, id: ProductId) -> Option<f64> {
        self.products
            .with(|products| products.get(&id).map(|product| product.price))
    }

    pub fn with<R>(&self, f: impl FnOnce(&HashMap<ProductId, Product>) -> R) -> R {
        self.products.with(f)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.products.with(|products| products.contains_key(&id))
    }

    pub fn len(&self) -> usize {
        self.products.with(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> State<HashMap<ProductId, Product>> {
        self.products.as_state()
    }
}

impl Default for ProductIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use storefront_testing::product;

    use super::*;

    #[test]
    fn later_merge_wins_for_the_same_id() {
        let index = ProductIndex::new();
        index.merge(&[product(1, 100.0), product(2, 50.0)]);
        index.merge(&[product(1, 120.0)]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.price(1), Some(120.0));
        assert_eq!(index.price(3), None);
    }

    #[test]
    fn clones_share_the_same_entries() {
        let index = ProductIndex::new();
        let reader = index.clone();

        index.merge(&[product(5, 10.0)]);

        assert!(reader.contains(5));
        assert_eq!(reader.get(5).map(|p| p.title), Some("Product 5".to_owned()));
    }
}
