use std::rc::Rc;

use storefront_api::{OrderLine, OrderRequest};
use storefront_core::{MemoryStorage, Storage};
use storefront_testing::{FakeShopApi, RuntimeDriver};

use super::*;
use crate::error::PHONE_FORMAT_MESSAGE;

struct Checkout {
    driver: RuntimeDriver,
    api: Rc<FakeShopApi>,
    cart: CartStore,
    phone: PhoneInputController,
    order: OrderSubmissionController,
}

fn checkout() -> Checkout {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
    let cart = CartStore::new(Rc::clone(&storage));
    let phone = PhoneInputController::new(storage);
    let order = OrderSubmissionController::new(
        api.clone(),
        driver.handle(),
        cart.clone(),
        phone.clone(),
    );
    Checkout {
        driver,
        api,
        cart,
        phone,
        order,
    }
}

#[test]
fn incomplete_phone_never_reaches_the_network() {
    let c = checkout();
    c.cart.buy(1);
    c.order.on_phone_input("+7 999 12");

    assert!(!c.order.submit());
    c.driver.settle();

    let state = c.order.snapshot();
    assert_eq!(state.phase, SubmissionPhase::Idle);
    assert_eq!(state.error.as_deref(), Some(PHONE_FORMAT_MESSAGE));
    assert!(c.api.calls().is_empty());
}

#[test]
fn accepted_order_clears_cart_and_phone() {
    let c = checkout();
    c.cart.buy(1);
    c.cart.increment(1);
    c.cart.buy(3);
    c.order.on_phone_input("89991234567");
    c.api.respond_order(Ok(()));

    assert!(c.order.submit());
    assert!(c.order.snapshot().is_loading());
    c.driver.settle();

    assert_eq!(
        c.api.submitted_orders(),
        vec![OrderRequest {
            phone: "79991234567".to_owned(),
            cart: vec![
                OrderLine { id: 1, quantity: 2 },
                OrderLine { id: 3, quantity: 1 },
            ],
        }]
    );
    let state = c.order.snapshot();
    assert_eq!(state.phase, SubmissionPhase::Succeeded);
    assert!(state.modal_open);
    assert!(!state.is_loading());
    assert_eq!(state.error, None);
    assert!(c.cart.is_empty());
    assert_eq!(c.phone.digits(), "");
}

#[test]
fn rejected_order_keeps_cart_and_phone() {
    let c = checkout();
    c.cart.buy(2);
    c.order.on_phone_input("79991234567");
    c.api.respond_order(Err(storefront_api::ApiError::order_rejected()));

    c.order.submit();
    c.driver.settle();

    let state = c.order.snapshot();
    assert_eq!(state.phase, SubmissionPhase::Failed);
    assert_eq!(state.error.as_deref(), Some(ORDER_RETRY_MESSAGE));
    assert!(!state.modal_open);
    assert_eq!(c.cart.quantity(2), 1);
    assert_eq!(c.phone.digits(), "79991234567");

    c.api.respond_order(Ok(()));
    assert!(c.order.submit());
    assert_eq!(c.order.snapshot().error, None);
    c.driver.settle();

    assert_eq!(c.api.submitted_orders().len(), 2);
    assert!(c.order.snapshot().modal_open);
}

#[test]
fn submit_is_ignored_while_in_flight() {
    let c = checkout();
    c.order.on_phone_input("79991234567");
    let pending = c.api.defer_order();

    assert!(c.order.submit());
    c.driver.settle();
    assert!(!c.order.submit());
    assert_eq!(c.api.submitted_orders().len(), 1);

    pending.succeed(());
    c.driver.settle();
    assert_eq!(c.order.snapshot().phase, SubmissionPhase::Succeeded);
}

#[test]
fn empty_cart_may_still_be_submitted() {
    let c = checkout();
    c.order.on_phone_input("79991234567");
    c.api.respond_order(Ok(()));

    assert!(c.order.submit());
    c.driver.settle();

    assert!(c.api.submitted_orders()[0].cart.is_empty());
}

#[test]
fn dismissing_the_modal_returns_to_idle() {
    let c = checkout();
    c.order.on_phone_input("79991234567");
    c.api.respond_order(Ok(()));
    c.order.submit();
    c.driver.settle();
    c.cart.buy(5);

    c.order.dismiss_modal();

    let state = c.order.snapshot();
    assert_eq!(state.phase, SubmissionPhase::Idle);
    assert!(!state.modal_open);
    assert_eq!(c.cart.quantity(5), 1);
}

#[test]
fn editing_after_failure_returns_to_idle_and_keeps_message() {
    let c = checkout();
    c.order.on_phone_input("79991234567");
    c.api.respond_order(Err(storefront_api::ApiError::order_rejected()));
    c.order.submit();
    c.driver.settle();

    c.order.on_phone_input("7999123456");

    let state = c.order.snapshot();
    assert_eq!(state.phase, SubmissionPhase::Idle);
    assert_eq!(state.error.as_deref(), Some(ORDER_RETRY_MESSAGE));
    assert_eq!(c.phone.digits(), "7999123456");
}

#[test]
fn cart_edit_after_failure_returns_to_idle() {
    let c = checkout();
    c.cart.buy(4);
    c.order.on_phone_input("79991234567");
    c.api.respond_order(Err(storefront_api::ApiError::order_rejected()));
    c.order.submit();
    c.driver.settle();
    assert_eq!(c.order.snapshot().phase, SubmissionPhase::Failed);

    assert!(c.order.edit_cart(|cart| cart.set_quantity(4, "3")));

    let state = c.order.snapshot();
    assert_eq!(state.phase, SubmissionPhase::Idle);
    assert_eq!(state.error.as_deref(), Some(ORDER_RETRY_MESSAGE));
    assert_eq!(c.cart.quantity(4), 3);
}

#[test]
fn result_after_checkout_is_gone_is_ignored() {
    let c = checkout();
    c.cart.buy(1);
    c.order.on_phone_input("79991234567");
    let pending = c.api.defer_order();
    c.order.submit();
    c.driver.settle();

    let Checkout {
        driver, cart, order, ..
    } = c;
    drop(order);
    pending.succeed(());
    driver.settle();

    assert_eq!(cart.quantity(1), 1);
}
