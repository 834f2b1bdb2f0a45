//! Checkout: phone validation, the order request and the confirmation modal.

use std::rc::Rc;

use storefront_api::{ApiError, OrderRequest, ShopApi};
use storefront_core::{MutableState, RuntimeHandle, State, Subscription};

use crate::cart::CartStore;
use crate::error::ORDER_RETRY_MESSAGE;
use crate::phone::PhoneInputController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionState {
    pub phase: SubmissionPhase,
    pub error: Option<String>,
    pub modal_open: bool,
}

impl SubmissionState {
    /// The submit control is disabled while this is true.
    pub fn is_loading(&self) -> bool {
        self.phase == SubmissionPhase::Submitting
    }
}

struct OrderInner {
    api: Rc<dyn ShopApi>,
    runtime: RuntimeHandle,
    cart: CartStore,
    phone: PhoneInputController,
    state: MutableState<SubmissionState>,
}

impl OrderInner {
    fn finish(&self, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.cart.clear();
                self.phone.reset();
                self.state.update(|state| {
                    state.phase = SubmissionPhase::Succeeded;
                    state.modal_open = true;
                });
                log::debug!("order accepted");
            }
            Err(err) => {
                log::error!("order submission failed: {err}");
                self.state.update(|state| {
                    state.phase = SubmissionPhase::Failed;
                    state.error = Some(ORDER_RETRY_MESSAGE.to_owned());
                });
            }
        }
    }
}

/// Drives one order at a time from the cart and phone field.
///
/// On success the cart and phone are cleared and the confirmation modal
/// opens. On failure both are kept so the visitor can resubmit.
#[derive(Clone)]
pub struct OrderSubmissionController {
    inner: Rc<OrderInner>,
}

impl OrderSubmissionController {
    pub fn new(
        api: Rc<dyn ShopApi>,
        runtime: RuntimeHandle,
        cart: CartStore,
        phone: PhoneInputController,
    ) -> Self {
        Self {
            inner: Rc::new(OrderInner {
                api,
                runtime,
                cart,
                phone,
                state: MutableState::new(SubmissionState::default()),
            }),
        }
    }

    /// Validates the phone and sends the order. Returns whether a request
    /// was issued; an incomplete phone sets the error and returns `false`.
    pub fn submit(&self) -> bool {
        if self.inner.state.with(SubmissionState::is_loading) {
            return false;
        }
        self.inner
            .state
            .update(|state| state.phase = SubmissionPhase::Validating);

        let phone = match self.inner.phone.validate() {
            Ok(phone) => phone,
            Err(err) => {
                log::debug!("order not sent: {err:?}");
                self.inner.state.update(|state| {
                    state.phase = SubmissionPhase::Idle;
                    state.error = Some(err.to_string());
                });
                return false;
            }
        };

        let order = OrderRequest {
            phone,
            cart: self.inner.cart.order_lines(),
        };
        self.inner.state.update(|state| {
            state.phase = SubmissionPhase::Submitting;
            state.error = None;
        });

        let request = self.inner.api.submit_order(&order);
        let weak = Rc::downgrade(&self.inner);
        let spawned = self.inner.runtime.spawn_local(async move {
            let result = request.await;
            match weak.upgrade() {
                Some(inner) => inner.finish(result),
                None => log::debug!("checkout gone; dropping order result"),
            }
        });
        if spawned.is_none() {
            self.inner
                .state
                .update(|state| state.phase = SubmissionPhase::Idle);
        }
        spawned.is_some()
    }

    /// Feeds the phone field. Any edit returns a settled submission to
    /// `Idle`; the last error message stays until the next submit.
    pub fn on_phone_input(&self, raw: &str) {
        self.inner.phone.on_input(raw);
        self.settle_after_edit();
    }

    /// Applies a visitor's cart edit. Like a phone edit, it returns a
    /// settled submission to `Idle`.
    pub fn edit_cart<R>(&self, edit: impl FnOnce(&CartStore) -> R) -> R {
        let result = edit(&self.inner.cart);
        self.settle_after_edit();
        result
    }

    fn settle_after_edit(&self) {
        self.inner.state.update_if(|state| match state.phase {
            SubmissionPhase::Succeeded | SubmissionPhase::Failed => {
                state.phase = SubmissionPhase::Idle;
                true
            }
            _ => false,
        });
    }

    pub fn dismiss_modal(&self) {
        self.inner.state.update_if(|state| {
            if !state.modal_open {
                return false;
            }
            state.modal_open = false;
            if state.phase == SubmissionPhase::Succeeded {
                state.phase = SubmissionPhase::Idle;
            }
            true
        });
    }

    pub fn phone(&self) -> &PhoneInputController {
        &self.inner.phone
    }

    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    pub fn snapshot(&self) -> SubmissionState {
        self.inner.state.value()
    }

    pub fn state(&self) -> State<SubmissionState> {
        self.inner.state.as_state()
    }

    pub fn subscribe(&self, watcher: impl Fn(&SubmissionState) + 'static) -> Subscription {
        self.inner.state.subscribe(watcher)
    }
}

#[cfg(test)]
#[path = "tests/order_tests.rs"]
mod tests;
