//! Persisted product → quantity map.

use std::collections::BTreeMap;
use std::rc::Rc;

use storefront_api::{OrderLine, ProductId};
use storefront_core::{State, Storage, Subscription};

use crate::persistent::PersistentKeyedState;

pub const CART_STORAGE_KEY: &str = "cart";

/// Quantities by product id. Every stored quantity is at least 1.
pub type CartQuantities = BTreeMap<ProductId, u32>;

/// What a raw quantity field asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityInput {
    Set(u32),
    Clear,
    Rejected,
}

/// Reads a quantity field the way the storefront form does: leading
/// whitespace and a sign are skipped, then the leading digits are taken
/// (`"5abc"` is 5, `"3.7"` is 3). Only the exact empty string clears.
pub fn parse_quantity_input(raw: &str) -> QuantityInput {
    if raw.is_empty() {
        return QuantityInput::Clear;
    }
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];
    if digits.is_empty() || negative {
        return QuantityInput::Rejected;
    }
    match digits.parse::<u32>() {
        Ok(quantity) if quantity > 0 => QuantityInput::Set(quantity),
        _ => QuantityInput::Rejected,
    }
}

/// The visitor's cart, written to storage after every change.
///
/// Clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    quantities: Rc<PersistentKeyedState<CartQuantities>>,
}

impl CartStore {
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        Self::with_key(storage, CART_STORAGE_KEY)
    }

    pub fn with_key(storage: Rc<dyn Storage>, key: &str) -> Self {
        let quantities = PersistentKeyedState::new(storage, key, CartQuantities::new());
        quantities.update_if(|cart| {
            let before = cart.len();
            cart.retain(|_, quantity| *quantity > 0);
            cart.len() != before
        });
        Self {
            quantities: Rc::new(quantities),
        }
    }

    /// Puts exactly one of `id` in the cart, replacing any quantity.
    pub fn buy(&self, id: ProductId) {
        self.quantities.update(|cart| {
            cart.insert(id, 1);
        });
    }

    pub fn increment(&self, id: ProductId) {
        self.quantities.update(|cart| {
            let quantity = cart.entry(id).or_insert(0);
            *quantity = quantity.saturating_add(1);
        });
    }

    /// Removes `id` once its quantity would reach zero.
    pub fn decrement(&self, id: ProductId) {
        self.quantities.update(|cart| match cart.get(&id).copied() {
            Some(quantity) if quantity > 1 => {
                cart.insert(id, quantity - 1);
            }
            _ => {
                cart.remove(&id);
            }
        });
    }

    /// Applies a raw quantity field. Rejected input leaves the cart, and
    /// storage, untouched. Returns whether the cart changed.
    pub fn set_quantity(&self, id: ProductId, raw: &str) -> bool {
        match parse_quantity_input(raw) {
            QuantityInput::Set(quantity) => self
                .quantities
                .update_if(|cart| cart.insert(id, quantity) != Some(quantity)),
            QuantityInput::Clear => self.quantities.update_if(|cart| cart.remove(&id).is_some()),
            QuantityInput::Rejected => {
                log::debug!("ignoring quantity input {raw:?} for product {id}");
                false
            }
        }
    }

    pub fn remove(&self, id: ProductId) {
        self.quantities.update(|cart| {
            cart.remove(&id);
        });
    }

    pub fn clear(&self) {
        self.quantities.set(CartQuantities::new());
    }

    /// Zero when `id` is absent.
    pub fn quantity(&self, id: ProductId) -> u32 {
        self.quantities
            .with(|cart| cart.get(&id).copied().unwrap_or(0))
    }

    pub fn snapshot(&self) -> CartQuantities {
        self.quantities.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&CartQuantities) -> R) -> R {
        self.quantities.with(f)
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.with(CartQuantities::is_empty)
    }

    pub fn len(&self) -> usize {
        self.quantities.with(CartQuantities::len)
    }

    /// Order lines in ascending id order.
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.quantities.with(|cart| {
            cart.iter()
                .map(|(&id, &quantity)| OrderLine { id, quantity })
                .collect()
        })
    }

    pub fn state(&self) -> State<CartQuantities> {
        self.quantities.as_state()
    }

    pub fn subscribe(&self, watcher: impl Fn(&CartQuantities) + 'static) -> Subscription {
        self.quantities.state().subscribe(watcher)
    }
}

#[cfg(test)]
#[path = "tests/cart_tests.rs"]
mod tests;
