//! Scriptable [`ShopApi`] for driving stores without a network.
//!
//! Responses are queued per endpoint. A response is either ready at once or
//! deferred behind a [`Resolver`], which lets a test hold a request in flight
//! and complete it later, out of order if it likes.

use std::cell::RefCell;
use std::collections::VecDeque;

use storefront_api::{ApiError, ApiFuture, CatalogPage, OrderRequest, Review, ShopApi};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Products { page: u32, page_size: u32 },
    Reviews,
    Order(OrderRequest),
}

enum Reply<T> {
    Ready(Result<T, ApiError>),
    Deferred(oneshot::Receiver<Result<T, ApiError>>),
}

impl<T: 'static> Reply<T> {
    fn into_future(self) -> ApiFuture<T> {
        match self {
            Reply::Ready(result) => Box::pin(async move { result }),
            Reply::Deferred(receiver) => Box::pin(async move {
                receiver
                    .await
                    .unwrap_or_else(|_| Err(ApiError::Fetch("request abandoned".to_owned())))
            }),
        }
    }
}

/// Completes one deferred response.
#[must_use = "dropping a resolver abandons the request"]
pub struct Resolver<T> {
    sender: oneshot::Sender<Result<T, ApiError>>,
}

impl<T> Resolver<T> {
    pub fn resolve(self, result: Result<T, ApiError>) {
        // The receiver is gone when the request future was dropped.
        let _ = self.sender.send(result);
    }

    pub fn succeed(self, value: T) {
        self.resolve(Ok(value));
    }

    pub fn fail(self, error: ApiError) {
        self.resolve(Err(error));
    }
}

#[derive(Default)]
pub struct FakeShopApi {
    calls: RefCell<Vec<ApiCall>>,
    products: RefCell<VecDeque<Reply<CatalogPage>>>,
    reviews: RefCell<VecDeque<Reply<Vec<Review>>>>,
    orders: RefCell<VecDeque<Reply<()>>>,
}

fn deferred<T>() -> (Reply<T>, Resolver<T>) {
    let (sender, receiver) = oneshot::channel();
    (Reply::Deferred(receiver), Resolver { sender })
}

impl FakeShopApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_products(&self, result: Result<CatalogPage, ApiError>) {
        self.products.borrow_mut().push_back(Reply::Ready(result));
    }

    pub fn defer_products(&self) -> Resolver<CatalogPage> {
        let (reply, resolver) = deferred();
        self.products.borrow_mut().push_back(reply);
        resolver
    }

    pub fn respond_reviews(&self, result: Result<Vec<Review>, ApiError>) {
        self.reviews.borrow_mut().push_back(Reply::Ready(result));
    }

    pub fn defer_reviews(&self) -> Resolver<Vec<Review>> {
        let (reply, resolver) = deferred();
        self.reviews.borrow_mut().push_back(reply);
        resolver
    }

    pub fn respond_order(&self, result: Result<(), ApiError>) {
        self.orders.borrow_mut().push_back(Reply::Ready(result));
    }

    pub fn defer_order(&self) -> Resolver<()> {
        let (reply, resolver) = deferred();
        self.orders.borrow_mut().push_back(reply);
        resolver
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().clone()
    }

    pub fn product_requests(&self) -> Vec<u32> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                ApiCall::Products { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }

    pub fn review_requests(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, ApiCall::Reviews))
            .count()
    }

    pub fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                ApiCall::Order(order) => Some(order.clone()),
                _ => None,
            })
            .collect()
    }

    fn next<T: 'static>(queue: &RefCell<VecDeque<Reply<T>>>, endpoint: &str) -> ApiFuture<T> {
        match queue.borrow_mut().pop_front() {
            Some(reply) => reply.into_future(),
            None => {
                let message = format!("no scripted response for {endpoint}");
                Box::pin(async move { Err(ApiError::Fetch(message)) })
            }
        }
    }
}

impl ShopApi for FakeShopApi {
    fn fetch_products(&self, page: u32, page_size: u32) -> ApiFuture<CatalogPage> {
        self.calls
            .borrow_mut()
            .push(ApiCall::Products { page, page_size });
        Self::next(&self.products, "products")
    }

    fn fetch_reviews(&self) -> ApiFuture<Vec<Review>> {
        self.calls.borrow_mut().push(ApiCall::Reviews);
        Self::next(&self.reviews, "reviews")
    }

    fn submit_order(&self, order: &OrderRequest) -> ApiFuture<()> {
        self.calls.borrow_mut().push(ApiCall::Order(order.clone()));
        Self::next(&self.orders, "order")
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use storefront_api::{OrderLine, Review};

    use super::*;
    use crate::driver::RuntimeDriver;
    use crate::fixtures::{catalog_page, products};

    #[test]
    fn deferred_reply_completes_when_resolved() {
        let driver = RuntimeDriver::new();
        let api = FakeShopApi::new();
        let resolver = api.defer_reviews();
        let seen = Rc::new(RefCell::new(None));
        {
            let seen = Rc::clone(&seen);
            let request = api.fetch_reviews();
            driver.handle().spawn_local(async move {
                *seen.borrow_mut() = Some(request.await.map(|reviews| reviews.len()).ok());
            });
        }
        driver.settle();
        assert!(seen.borrow().is_none());

        resolver.succeed(vec![Review {
            id: 1,
            text: "ok".into(),
        }]);
        driver.settle();

        assert_eq!(*seen.borrow(), Some(Some(1)));
    }

    #[test]
    fn unscripted_call_fails_and_is_recorded() {
        let driver = RuntimeDriver::new();
        let api = FakeShopApi::new();
        api.respond_products(Ok(catalog_page(1, products(1, 1))));
        let failed = Rc::new(RefCell::new(false));
        for page in 1..=2 {
            let failed = Rc::clone(&failed);
            let request = api.fetch_products(page, 1);
            driver.handle().spawn_local(async move {
                if request.await.is_err() {
                    *failed.borrow_mut() = true;
                }
            });
        }
        let order = OrderRequest {
            phone: "79990000000".into(),
            cart: vec![OrderLine { id: 1, quantity: 1 }],
        };
        drop(api.submit_order(&order));
        driver.settle();

        assert!(*failed.borrow());
        assert_eq!(api.product_requests(), vec![1, 2]);
        assert_eq!(api.submitted_orders(), vec![order]);
    }
}
