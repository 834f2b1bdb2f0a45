//! Testing utilities and harness for the storefront state engine.

pub mod driver;
pub mod fake_api;
pub mod fixtures;

pub use driver::RuntimeDriver;
pub use fake_api::{ApiCall, FakeShopApi, Resolver};
pub use fixtures::{catalog_page, product, products};

pub mod prelude {
    pub use crate::driver::*;
    pub use crate::fake_api::*;
    pub use crate::fixtures::*;
}
