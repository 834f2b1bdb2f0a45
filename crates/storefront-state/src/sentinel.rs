//! Infinite-scroll trigger attached after the last rendered product.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use storefront_core::{EffectCleanup, EffectScope, KeyedEffect, RuntimeHandle, Subscription};

use crate::catalog::{CatalogState, CatalogStore};

struct SentinelInner {
    catalog: CatalogStore,
    runtime: RuntimeHandle,
    effect: RefCell<KeyedEffect>,
    /// Scope of the run that attached the sensor; inactive once detached.
    attachment: RefCell<Option<EffectScope>>,
    visible: Cell<bool>,
}

impl SentinelInner {
    fn react(self: &Rc<Self>, state: &CatalogState) {
        let observe = state.can_load();
        let retry_pending = state.error.is_some();
        let weak = Rc::downgrade(self);
        self.effect.borrow_mut().run(&observe, move |scope| {
            let Some(inner) = weak.upgrade() else {
                return EffectCleanup::none();
            };
            if !observe {
                inner.attachment.replace(None);
                return EffectCleanup::none();
            }
            if inner.visible.get() && !retry_pending {
                inner.schedule_load(scope.clone());
            }
            inner.attachment.replace(Some(scope));
            EffectCleanup::none()
        });
    }

    fn is_attached(&self) -> bool {
        self.attachment
            .borrow()
            .as_ref()
            .is_some_and(EffectScope::is_active)
    }

    /// Deferred so the load never starts inside a catalog notification.
    fn schedule_load(self: &Rc<Self>, scope: EffectScope) {
        let weak = Rc::downgrade(self);
        self.runtime.spawn_task(move || {
            if let Some(inner) = weak.upgrade() {
                if scope.is_active() && inner.visible.get() {
                    inner.catalog.load_next_page();
                }
            }
        });
    }
}

/// Visibility sensor for the end-of-list marker.
///
/// The sensor is attached only while the catalog has more pages and is not
/// loading. A visibility crossing while attached requests the next page.
/// When it re-attaches with the marker still on screen it requests the next
/// page too, unless the previous load failed. Dropping the observer
/// detaches it.
pub struct SentinelObserver {
    inner: Rc<SentinelInner>,
    _watch: Subscription,
}

impl SentinelObserver {
    pub fn attach(catalog: CatalogStore, runtime: RuntimeHandle) -> Self {
        let inner = Rc::new(SentinelInner {
            catalog: catalog.clone(),
            runtime,
            effect: RefCell::new(KeyedEffect::new()),
            attachment: RefCell::new(None),
            visible: Cell::new(false),
        });
        let watch = {
            let weak = Rc::downgrade(&inner);
            catalog.subscribe(move |state| {
                if let Some(inner) = weak.upgrade() {
                    inner.react(state);
                }
            })
        };
        catalog.with(|state| inner.react(state));
        Self {
            inner,
            _watch: watch,
        }
    }

    /// Reports the marker's visibility. Returns whether a page load started.
    pub fn set_visible(&self, visible: bool) -> bool {
        let was_visible = self.inner.visible.replace(visible);
        if !visible || was_visible || !self.inner.is_attached() {
            return false;
        }
        self.inner.catalog.load_next_page()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.is_attached()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }
}

impl Drop for SentinelObserver {
    fn drop(&mut self) {
        self.inner.effect.borrow_mut().dispose();
        self.inner.attachment.replace(None);
        self.inner.visible.set(false);
    }
}

#[cfg(test)]
#[path = "tests/sentinel_tests.rs"]
mod tests;
