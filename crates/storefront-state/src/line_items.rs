//! Cart entries joined against the catalog for display and totals.

use storefront_api::ProductId;

use crate::cart::CartQuantities;
use crate::product_index::ProductIndex;

#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub qty: u32,
}

impl CartLineItem {
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.qty)
    }
}

/// Line items in cart order. Entries with no catalog match are skipped.
pub fn line_items(cart: &CartQuantities, index: &ProductIndex) -> Vec<CartLineItem> {
    index.with(|products| {
        cart.iter()
            .filter_map(|(id, &qty)| {
                products.get(id).map(|product| CartLineItem {
                    id: *id,
                    title: product.title.clone(),
                    price: product.price,
                    qty,
                })
            })
            .collect()
    })
}

/// Sum of price × quantity; unknown products count as zero.
pub fn total_price(cart: &CartQuantities, index: &ProductIndex) -> f64 {
    index.with(|products| {
        cart.iter()
            .map(|(id, &qty)| {
                products
                    .get(id)
                    .map_or(0.0, |product| product.price * f64::from(qty))
            })
            .sum()
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use storefront_testing::product;

    use super::*;

    #[test]
    fn unmatched_entries_are_dropped_and_priced_at_zero() {
        let index = ProductIndex::new();
        index.merge(&[product(1, 100.0)]);
        let cart = CartQuantities::from([(1, 2), (99, 5)]);

        let items = line_items(&cart, &index);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Product 1");
        assert_eq!(items[0].qty, 2);
        assert_eq!(items[0].subtotal(), 200.0);
        assert_eq!(total_price(&cart, &index), 200.0);
    }

    #[test]
    fn late_catalog_pages_fill_in_line_items() {
        let index = ProductIndex::new();
        let cart = CartQuantities::from([(3, 1)]);
        assert!(line_items(&cart, &index).is_empty());
        assert_eq!(total_price(&cart, &index), 0.0);

        index.merge(&[product(3, 75.0)]);

        assert_eq!(total_price(&cart, &index), 75.0);
    }

    proptest! {
        #[test]
        fn total_matches_sum_of_known_entries(
            cart in prop::collection::btree_map(1u64..40, 1u32..20, 0..12),
            known in prop::collection::btree_map(1u64..40, 0u32..1000, 0..20),
        ) {
            let index = ProductIndex::new();
            let catalog: Vec<_> = known
                .iter()
                .map(|(&id, &price)| product(id, f64::from(price)))
                .collect();
            index.merge(&catalog);

            let expected: f64 = cart
                .iter()
                .filter_map(|(id, &qty)| known.get(id).map(|&price| f64::from(price) * f64::from(qty)))
                .sum();

            prop_assert_eq!(total_price(&cart, &index), expected);
            prop_assert_eq!(
                line_items(&cart, &index).len(),
                cart.keys().filter(|id| known.contains_key(id)).count()
            );
        }
    }
}
