//! Client-side commerce state: catalog pages, the persisted cart, the phone
//! mask and order submission.
//!
//! Every store is a cheap `Clone` handle over shared single-threaded state.
//! Asynchronous work runs on the [`storefront_core::Runtime`] passed in at
//! construction and only holds weak references to its store, so dropping a
//! store turns its late completions into no-ops.

pub mod appearance;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod line_items;
pub mod order;
pub mod persistent;
pub mod phone;
pub mod product_index;
pub mod reviews;
pub mod sentinel;

pub use appearance::{AppearanceScheduler, APPEAR_DELAY_MILLIS};
pub use cart::{parse_quantity_input, CartQuantities, CartStore, QuantityInput, CART_STORAGE_KEY};
pub use catalog::{CatalogState, CatalogStore, DEFAULT_PAGE_SIZE};
pub use error::{ValidationError, ORDER_RETRY_MESSAGE, PHONE_FORMAT_MESSAGE};
pub use line_items::{line_items, total_price, CartLineItem};
pub use order::{OrderSubmissionController, SubmissionPhase, SubmissionState};
pub use persistent::{read_persisted, write_persisted, PersistentKeyedState};
pub use phone::{
    format_phone, normalize_phone_input, placeholder_mask, PhoneInputController,
    PHONE_DIGITS, PHONE_STORAGE_KEY,
};
pub use product_index::ProductIndex;
pub use reviews::{ReviewFeed, ReviewFeedState};
pub use sentinel::SentinelObserver;
