//! Root view of the storefront: owns the runtime and every store, turns
//! visitor intents into store calls and state into [`StorefrontFrame`]s.

mod frame;
mod options;

pub use frame::{CartView, CatalogView, CheckoutView, ProductCard, StorefrontFrame};
pub use options::{StorefrontOptions, ENV_API_BASE, ENV_APPEAR_DELAY_MS, ENV_PAGE_SIZE};

use std::cell::Cell;
use std::rc::Rc;

use storefront_api::{ProductId, ShopApi};
use storefront_core::{CoreError, LocalContext, State, Storage, Subscription};
use storefront_runtime_std::StdRuntime;
use storefront_state::{
    line_items, total_price, AppearanceScheduler, CartStore, CatalogStore,
    OrderSubmissionController, PhoneInputController, ProductIndex, ReviewFeed, SentinelObserver,
};

pub struct StorefrontShell {
    runtime: StdRuntime,
    options: StorefrontOptions,
    context: LocalContext,
    catalog: CatalogStore,
    order: OrderSubmissionController,
    reviews: ReviewFeed,
    appearance: AppearanceScheduler<ProductId>,
    sentinel: Option<SentinelObserver>,
    dirty: Rc<Cell<bool>>,
    _invalidations: Vec<Subscription>,
}

impl StorefrontShell {
    /// Builds every store, provides the shared ones through the context and
    /// starts the first catalog page and the review load.
    pub fn mount(options: StorefrontOptions, api: Rc<dyn ShopApi>, storage: Rc<dyn Storage>) -> Self {
        let runtime = StdRuntime::new();
        let handle = runtime.runtime_handle();

        let index = ProductIndex::new();
        let catalog = CatalogStore::with_page_size(
            Rc::clone(&api),
            handle.clone(),
            index.clone(),
            options.page_size,
        );
        let cart = CartStore::with_key(Rc::clone(&storage), &options.cart_key);
        let phone = PhoneInputController::with_key(storage, &options.phone_key);
        let order =
            OrderSubmissionController::new(Rc::clone(&api), handle.clone(), cart.clone(), phone);
        let reviews = ReviewFeed::new(api, handle.clone());
        let appearance =
            AppearanceScheduler::with_delay(runtime.timers(), options.appear_delay_millis);
        let sentinel = SentinelObserver::attach(catalog.clone(), handle);

        let mut context = LocalContext::new();
        context.provide(index.clone()).provide(cart.clone());

        let dirty = Rc::new(Cell::new(true));
        let invalidations = vec![
            invalidate_on(&catalog.state(), &dirty),
            invalidate_on(&cart.state(), &dirty),
            invalidate_on(&order.state(), &dirty),
            invalidate_on(&order.phone().state(), &dirty),
            invalidate_on(&reviews.state(), &dirty),
            invalidate_on(&index.state(), &dirty),
            invalidate_on(&appearance.appeared_state(), &dirty),
        ];

        catalog.mount();
        reviews.load();
        log::info!("storefront mounted against {}", options.api_base);

        Self {
            runtime,
            options,
            context,
            catalog,
            order,
            reviews,
            appearance,
            sentinel: Some(sentinel),
            dirty,
            _invalidations: invalidations,
        }
    }

    pub fn options(&self) -> &StorefrontOptions {
        &self.options
    }

    pub fn runtime(&self) -> &StdRuntime {
        &self.runtime
    }

    pub fn context(&self) -> &LocalContext {
        &self.context
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn order(&self) -> &OrderSubmissionController {
        &self.order
    }

    pub fn reviews(&self) -> &ReviewFeed {
        &self.reviews
    }

    /// Fires timers due at `now_millis`, then runs tasks and ready futures.
    pub fn update_at(&self, now_millis: u64) {
        self.runtime.drive(now_millis);
    }

    pub fn update(&self) {
        self.update_at(self.runtime.elapsed_millis());
    }

    pub fn should_render(&self) -> bool {
        let requested = self.runtime.take_frame_request();
        requested || self.dirty.get() || self.runtime.runtime_handle().has_pending_tasks()
    }

    /// Earliest pending timer deadline on the runtime's clock.
    pub fn next_deadline_millis(&self) -> Option<u64> {
        self.runtime.runtime_handle().next_timer_deadline()
    }

    pub fn set_frame_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.runtime.set_frame_waker(waker);
    }

    /// Snapshots every store into a frame. Also hands the current product
    /// ids to the appearance scheduler.
    pub fn render(&self) -> Result<StorefrontFrame, CoreError> {
        let index = self.context.require::<ProductIndex>()?;
        let cart = self.context.require::<CartStore>()?;
        let catalog = self.catalog.snapshot();

        let ids: Vec<ProductId> = catalog.products.iter().map(|product| product.id).collect();
        self.appearance.observe(&ids);

        let cards = catalog
            .products
            .iter()
            .map(|product| ProductCard {
                id: product.id,
                title: product.title.clone(),
                description: product.description.clone(),
                image_url: product.image_url.clone(),
                price: product.price,
                quantity: cart.quantity(product.id),
                visible: self.appearance.is_visible(&product.id),
            })
            .collect();
        let (items, total) =
            cart.with(|quantities| (line_items(quantities, &index), total_price(quantities, &index)));
        let submission = self.order.snapshot();
        let phone = self.order.phone();

        let frame = StorefrontFrame {
            catalog: CatalogView {
                cards,
                loading: catalog.loading,
                error: catalog.error.clone(),
                has_more: catalog.has_more,
                end_of_catalog: catalog.end_of_catalog(),
            },
            cart: CartView {
                items,
                total_price: total,
            },
            checkout: CheckoutView {
                phone_display: phone.display(),
                phone_placeholder: phone.placeholder(),
                error: submission.error.clone(),
                loading: submission.is_loading(),
                modal_open: submission.modal_open,
            },
            reviews: self.reviews.snapshot(),
        };
        self.dirty.set(false);
        Ok(frame)
    }

    pub fn buy(&self, id: ProductId) {
        self.order.edit_cart(|cart| cart.buy(id));
    }

    pub fn increment(&self, id: ProductId) {
        self.order.edit_cart(|cart| cart.increment(id));
    }

    pub fn decrement(&self, id: ProductId) {
        self.order.edit_cart(|cart| cart.decrement(id));
    }

    pub fn set_quantity(&self, id: ProductId, raw: &str) -> bool {
        self.order.edit_cart(|cart| cart.set_quantity(id, raw))
    }

    pub fn remove_from_cart(&self, id: ProductId) {
        self.order.edit_cart(|cart| cart.remove(id));
    }

    pub fn phone_input(&self, raw: &str) {
        self.order.on_phone_input(raw);
    }

    pub fn submit_order(&self) -> bool {
        self.order.submit()
    }

    pub fn dismiss_modal(&self) {
        self.order.dismiss_modal();
    }

    /// Reports whether the end-of-list marker is on screen.
    pub fn sentinel_visibility(&self, visible: bool) -> bool {
        self.sentinel
            .as_ref()
            .map(|sentinel| sentinel.set_visible(visible))
            .unwrap_or(false)
    }

    pub fn retry_catalog(&self) -> bool {
        self.catalog.retry()
    }

    pub fn reload_reviews(&self) -> bool {
        self.reviews.reload()
    }

    pub fn dismiss_catalog_error(&self) -> bool {
        self.catalog.dismiss_error()
    }

    pub fn dismiss_reviews_error(&self) -> bool {
        self.reviews.dismiss_error()
    }

    /// Tears the view down. Requests still in flight complete into nothing.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for StorefrontShell {
    fn drop(&mut self) {
        self.sentinel.take();
        self.appearance.cancel_pending();
        self.runtime.clear_frame_waker();
        log::debug!("storefront unmounted");
    }
}

fn invalidate_on<T: Clone + 'static>(state: &State<T>, dirty: &Rc<Cell<bool>>) -> Subscription {
    let dirty = Rc::clone(dirty);
    state.subscribe(move |_: &T| dirty.set(true))
}
