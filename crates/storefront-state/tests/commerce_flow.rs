use std::rc::Rc;

use storefront_api::Product;
use storefront_core::{MemoryStorage, Storage};
use storefront_state::{
    line_items, total_price, CartStore, CatalogStore, OrderSubmissionController,
    PhoneInputController, ProductIndex, SubmissionPhase,
};
use storefront_testing::{catalog_page, FakeShopApi, RuntimeDriver};

fn tea() -> Product {
    Product {
        id: 1,
        image_url: "https://cdn.test/tea.png".into(),
        title: "Tea".into(),
        description: "Green tea".into(),
        price: 150.0,
    }
}

#[test]
fn buy_increment_and_check_out() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::new());
    api.respond_products(Ok(catalog_page(1, vec![tea()])));
    api.respond_order(Ok(()));

    let index = ProductIndex::new();
    let catalog = CatalogStore::new(api.clone(), driver.handle(), index.clone());
    let cart = CartStore::new(Rc::clone(&storage));
    let phone = PhoneInputController::new(Rc::clone(&storage));
    let order =
        OrderSubmissionController::new(api.clone(), driver.handle(), cart.clone(), phone.clone());

    catalog.mount();
    driver.settle();

    cart.buy(1);
    cart.increment(1);
    assert_eq!(cart.quantity(1), 2);
    cart.with(|quantities| {
        assert_eq!(total_price(quantities, &index), 300.0);
        assert_eq!(line_items(quantities, &index)[0].title, "Tea");
    });

    order.on_phone_input("+7 (999) 123-45-67");
    assert!(order.submit());
    driver.settle();

    assert!(cart.is_empty());
    assert_eq!(phone.digits(), "");
    let state = order.snapshot();
    assert!(state.modal_open);
    assert_eq!(state.phase, SubmissionPhase::Succeeded);
    assert_eq!(storage.get_item("cart").as_deref(), Some("{}"));
    assert_eq!(storage.get_item("phone").as_deref(), Some("\"\""));
}

#[test]
fn cart_outlives_a_reload_while_catalog_starts_over() {
    let memory = MemoryStorage::new();
    {
        let cart = CartStore::new(Rc::new(memory.clone()));
        cart.buy(1);
        cart.set_quantity(99, "5");
    }

    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    api.respond_products(Ok(catalog_page(1, vec![tea()])));
    let index = ProductIndex::new();
    let catalog = CatalogStore::new(api.clone(), driver.handle(), index.clone());
    let cart = CartStore::new(Rc::new(memory));

    cart.with(|quantities| assert_eq!(total_price(quantities, &index), 0.0));
    catalog.mount();
    driver.settle();

    cart.with(|quantities| {
        assert_eq!(total_price(quantities, &index), 150.0);
        assert_eq!(line_items(quantities, &index).len(), 1);
    });
    assert_eq!(cart.quantity(99), 5);
}
