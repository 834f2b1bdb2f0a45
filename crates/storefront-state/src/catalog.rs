//! Paginated product catalog with a single in-flight page load.

use std::rc::{Rc, Weak};

use storefront_api::{ApiError, CatalogPage, Product, ProductId, ShopApi};
use storefront_core::{MutableState, RuntimeHandle, State, Subscription};

use crate::product_index::ProductIndex;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogState {
    /// Fetch order; duplicates across pages are kept.
    pub products: Vec<Product>,
    /// Next page to request.
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            page: 1,
            has_more: true,
            loading: false,
            error: None,
        }
    }
}

impl CatalogState {
    /// Whether a load may start right now.
    pub fn can_load(&self) -> bool {
        self.has_more && !self.loading
    }

    pub fn end_of_catalog(&self) -> bool {
        !self.has_more && !self.loading
    }
}

struct CatalogInner {
    api: Rc<dyn ShopApi>,
    runtime: RuntimeHandle,
    page_size: u32,
    state: MutableState<CatalogState>,
    index: ProductIndex,
}

impl CatalogInner {
    fn finish_page(&self, page: u32, result: Result<CatalogPage, ApiError>) {
        match result {
            Ok(response) => {
                let received = response.items.len();
                self.index.merge(&response.items);
                let page_size = self.page_size;
                self.state.update(|state| {
                    state.products.extend(response.items);
                    state.has_more = received == page_size as usize;
                    state.page = page + 1;
                    state.loading = false;
                });
                log::debug!("catalog page {page} merged {received} products");
            }
            Err(err) => {
                log::warn!("catalog page {page} failed: {err}");
                self.state.update(|state| {
                    state.error = Some(err.to_string());
                    state.loading = false;
                });
            }
        }
    }
}

/// Clears `loading` if the page future is dropped before it settles.
struct LoadingGuard {
    inner: Weak<CatalogInner>,
    armed: bool,
}

impl LoadingGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            log::debug!("catalog page load abandoned");
            inner
                .state
                .update_if(|state| std::mem::replace(&mut state.loading, false));
        }
    }
}

/// Owns the catalog pages and keeps [`ProductIndex`] in step with them.
///
/// At most one page request is in flight; pages are requested strictly in
/// increasing order and a failed page is requested again on the next load.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Rc<CatalogInner>,
}

impl CatalogStore {
    pub fn new(api: Rc<dyn ShopApi>, runtime: RuntimeHandle, index: ProductIndex) -> Self {
        Self::with_page_size(api, runtime, index, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(
        api: Rc<dyn ShopApi>,
        runtime: RuntimeHandle,
        index: ProductIndex,
        page_size: u32,
    ) -> Self {
        Self {
            inner: Rc::new(CatalogInner {
                api,
                runtime,
                page_size,
                state: MutableState::new(CatalogState::default()),
                index,
            }),
        }
    }

    /// Loads the first page unless something has been loaded or is loading.
    pub fn mount(&self) -> bool {
        let untouched = self
            .inner
            .state
            .with(|state| state.page == 1 && state.products.is_empty() && state.error.is_none());
        untouched && self.load_next_page()
    }

    /// Requests the next page. Returns `false` without side effects while a
    /// load is in flight or after the last page.
    pub fn load_next_page(&self) -> bool {
        let mut requested = None;
        self.inner.state.update_if(|state| {
            if !state.can_load() {
                return false;
            }
            state.loading = true;
            state.error = None;
            requested = Some(state.page);
            true
        });
        let Some(page) = requested else {
            return false;
        };

        log::debug!("requesting catalog page {page}");
        let request = self.inner.api.fetch_products(page, self.inner.page_size);
        let guard = LoadingGuard {
            inner: Rc::downgrade(&self.inner),
            armed: true,
        };
        let weak = Rc::downgrade(&self.inner);
        let spawned = self.inner.runtime.spawn_local(async move {
            let result = request.await;
            match weak.upgrade() {
                Some(inner) => {
                    guard.disarm();
                    inner.finish_page(page, result);
                }
                None => log::debug!("catalog gone; dropping page {page}"),
            }
        });
        spawned.is_some()
    }

    /// Re-requests the page that last failed. Does nothing without a
    /// recorded failure.
    pub fn retry(&self) -> bool {
        if self.inner.state.with(|state| state.error.is_none()) {
            return false;
        }
        self.load_next_page()
    }

    /// Hides the failure message. The failed page stays the next one to
    /// request.
    pub fn dismiss_error(&self) -> bool {
        self.inner
            .state
            .update_if(|state| state.error.take().is_some())
    }

    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    pub fn index(&self) -> &ProductIndex {
        &self.inner.index
    }

    pub fn state(&self) -> State<CatalogState> {
        self.inner.state.as_state()
    }

    pub fn snapshot(&self) -> CatalogState {
        self.inner.state.value()
    }

    pub fn with<R>(&self, f: impl FnOnce(&CatalogState) -> R) -> R {
        self.inner.state.with(f)
    }

    pub fn subscribe(&self, watcher: impl Fn(&CatalogState) + 'static) -> Subscription {
        self.inner.state.subscribe(watcher)
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.inner
            .state
            .with(|state| state.products.iter().map(|product| product.id).collect())
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.with(|state| state.loading)
    }

    pub fn has_more(&self) -> bool {
        self.inner.state.with(|state| state.has_more)
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.with(|state| state.error.clone())
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
