use std::rc::Rc;

use storefront_api::ApiError;
use storefront_testing::{catalog_page, products, FakeShopApi, RuntimeDriver};

use super::*;

fn store(driver: &RuntimeDriver, api: &Rc<FakeShopApi>, page_size: u32) -> CatalogStore {
    CatalogStore::with_page_size(api.clone(), driver.handle(), ProductIndex::new(), page_size)
}

#[test]
fn full_page_merges_products_and_advances() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    api.respond_products(Ok(catalog_page(1, products(1, 3))));
    let catalog = store(&driver, &api, 3);

    assert!(catalog.load_next_page());
    assert!(catalog.is_loading());
    driver.settle();

    let state = catalog.snapshot();
    assert_eq!(catalog.product_ids(), vec![1, 2, 3]);
    assert_eq!(state.page, 2);
    assert!(state.has_more);
    assert!(!state.loading);
    assert_eq!(catalog.index().price(2), Some(200.0));
}

#[test]
fn short_page_ends_the_catalog() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    api.respond_products(Ok(catalog_page(1, products(1, 2))));
    let catalog = store(&driver, &api, 3);

    catalog.load_next_page();
    driver.settle();

    assert!(!catalog.has_more());
    assert!(catalog.snapshot().end_of_catalog());
    assert!(!catalog.load_next_page());
    assert_eq!(api.product_requests(), vec![1]);
}

#[test]
fn empty_first_page_stops_pagination() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    api.respond_products(Ok(catalog_page(1, Vec::new())));
    let catalog = store(&driver, &api, DEFAULT_PAGE_SIZE);

    assert!(catalog.mount());
    driver.settle();

    assert!(!catalog.has_more());
    assert!(catalog.product_ids().is_empty());
    assert!(!catalog.load_next_page());
}

#[test]
fn concurrent_loads_issue_one_request() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    let first = api.defer_products();
    let catalog = store(&driver, &api, 2);

    assert!(catalog.load_next_page());
    assert!(!catalog.load_next_page());
    driver.settle();
    assert!(!catalog.load_next_page());
    assert_eq!(api.product_requests(), vec![1]);

    first.succeed(catalog_page(1, products(1, 2)));
    driver.settle();
    assert!(!catalog.is_loading());

    api.respond_products(Ok(catalog_page(2, products(3, 2))));
    assert!(catalog.load_next_page());
    driver.settle();

    assert_eq!(api.product_requests(), vec![1, 2]);
    assert_eq!(catalog.product_ids(), vec![1, 2, 3, 4]);
}

#[test]
fn failed_page_is_retried_not_skipped() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    api.respond_products(Err(ApiError::products_unavailable()));
    let catalog = store(&driver, &api, 2);

    catalog.load_next_page();
    driver.settle();

    let failed = catalog.snapshot();
    assert_eq!(failed.error.as_deref(), Some("Failed to fetch products"));
    assert_eq!(failed.page, 1);
    assert!(failed.products.is_empty());
    assert!(!failed.loading);

    api.respond_products(Ok(catalog_page(1, products(1, 2))));
    assert!(catalog.retry());
    assert_eq!(catalog.error(), None);
    driver.settle();

    assert_eq!(api.product_requests(), vec![1, 1]);
    assert_eq!(catalog.product_ids(), vec![1, 2]);
    assert_eq!(catalog.snapshot().page, 2);
}

#[test]
fn dismissed_failure_still_requests_the_same_page() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    api.respond_products(Ok(catalog_page(1, products(1, 2))));
    let catalog = store(&driver, &api, 2);
    catalog.load_next_page();
    driver.settle();

    api.respond_products(Err(ApiError::products_unavailable()));
    catalog.load_next_page();
    driver.settle();

    assert!(catalog.dismiss_error());
    assert!(!catalog.dismiss_error());
    let dismissed = catalog.snapshot();
    assert_eq!(dismissed.error, None);
    assert_eq!(dismissed.page, 2);
    assert_eq!(dismissed.products.len(), 2);
    assert!(dismissed.has_more);

    api.respond_products(Ok(catalog_page(2, products(3, 1))));
    assert!(catalog.load_next_page());
    driver.settle();

    assert_eq!(api.product_requests(), vec![1, 2, 2]);
    assert_eq!(catalog.product_ids(), vec![1, 2, 3]);
}

#[test]
fn retry_without_failure_does_nothing() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    let catalog = store(&driver, &api, 2);

    assert!(!catalog.retry());
    assert!(api.calls().is_empty());
}

#[test]
fn duplicate_ids_across_pages_are_kept_in_the_list() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    api.respond_products(Ok(catalog_page(1, products(1, 2))));
    api.respond_products(Ok(catalog_page(2, products(2, 2))));
    let catalog = store(&driver, &api, 2);

    catalog.load_next_page();
    driver.settle();
    catalog.load_next_page();
    driver.settle();

    assert_eq!(catalog.product_ids(), vec![1, 2, 2, 3]);
    assert_eq!(catalog.index().len(), 3);
}

#[test]
fn late_completion_after_drop_is_ignored() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    let pending = api.defer_products();
    let index = ProductIndex::new();
    let catalog =
        CatalogStore::with_page_size(api.clone(), driver.handle(), index.clone(), 2);

    catalog.load_next_page();
    driver.settle();
    drop(catalog);

    pending.succeed(catalog_page(1, products(1, 2)));
    driver.settle();

    assert!(index.is_empty());
    assert_eq!(driver.handle().in_flight_tasks(), 0);
}

#[test]
fn dropping_the_runtime_releases_loading() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    let _pending = api.defer_products();
    let catalog = store(&driver, &api, 2);

    catalog.load_next_page();
    driver.settle();
    assert!(catalog.is_loading());

    drop(driver);

    assert!(!catalog.is_loading());
}

#[test]
fn subscribers_see_loading_then_result() {
    let driver = RuntimeDriver::new();
    let api = Rc::new(FakeShopApi::new());
    api.respond_products(Ok(catalog_page(1, products(1, 1))));
    let catalog = store(&driver, &api, 1);
    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let _sub = {
        let seen = Rc::clone(&seen);
        catalog.subscribe(move |state| seen.borrow_mut().push((state.loading, state.products.len())))
    };

    catalog.load_next_page();
    driver.settle();

    assert_eq!(*seen.borrow(), vec![(true, 0), (false, 1)]);
}
