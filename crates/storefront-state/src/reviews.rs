use std::cell::Cell;
use std::rc::Rc;

use storefront_api::{ApiError, Review, ShopApi};
use storefront_core::{MutableState, RuntimeHandle, State};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewFeedState {
    pub reviews: Vec<Review>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ReviewFeedState {
    fn default() -> Self {
        Self {
            reviews: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

struct ReviewInner {
    api: Rc<dyn ShopApi>,
    runtime: RuntimeHandle,
    in_flight: Cell<bool>,
    state: MutableState<ReviewFeedState>,
}

impl ReviewInner {
    fn finish(&self, result: Result<Vec<Review>, ApiError>) {
        self.in_flight.set(false);
        self.state.update(|state| {
            match result {
                Ok(reviews) => state.reviews = reviews,
                Err(err) => {
                    log::warn!("reviews failed: {err}");
                    state.error = Some(err.to_string());
                }
            }
            state.loading = false;
        });
    }
}

/// Read-only review list, loaded like a catalog page but in one request.
/// `loading` starts out `true` so the first frame shows a placeholder.
#[derive(Clone)]
pub struct ReviewFeed {
    inner: Rc<ReviewInner>,
}

impl ReviewFeed {
    pub fn new(api: Rc<dyn ShopApi>, runtime: RuntimeHandle) -> Self {
        Self {
            inner: Rc::new(ReviewInner {
                api,
                runtime,
                in_flight: Cell::new(false),
                state: MutableState::new(ReviewFeedState::default()),
            }),
        }
    }

    pub fn load(&self) -> bool {
        if self.inner.in_flight.replace(true) {
            return false;
        }
        self.inner.state.update_if(|state| {
            let changed = !state.loading || state.error.is_some();
            state.loading = true;
            state.error = None;
            changed
        });

        let request = self.inner.api.fetch_reviews();
        let weak = Rc::downgrade(&self.inner);
        let spawned = self.inner.runtime.spawn_local(async move {
            let result = request.await;
            match weak.upgrade() {
                Some(inner) => inner.finish(result),
                None => log::debug!("review feed gone; dropping response"),
            }
        });
        if spawned.is_none() {
            self.inner.in_flight.set(false);
        }
        spawned.is_some()
    }

    /// Fetches the list again, keeping the current reviews until it lands.
    pub fn reload(&self) -> bool {
        self.load()
    }

    pub fn dismiss_error(&self) -> bool {
        self.inner
            .state
            .update_if(|state| state.error.take().is_some())
    }

    pub fn snapshot(&self) -> ReviewFeedState {
        self.inner.state.value()
    }

    pub fn state(&self) -> State<ReviewFeedState> {
        self.inner.state.as_state()
    }
}
