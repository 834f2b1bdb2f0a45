//! Delayed "has appeared" bookkeeping for entities entering a list.

use std::cell::RefCell;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use indexmap::IndexSet;
use storefront_core::map::HashMap;
use storefront_core::{MutableState, State, TimerRegistration, Timers};

pub const APPEAR_DELAY_MILLIS: u64 = 50;

struct AppearanceInner<Id: Clone + 'static> {
    timers: Timers,
    delay_millis: u64,
    appeared: MutableState<Rc<IndexSet<Id>>>,
    live: RefCell<IndexSet<Id>>,
    pending: RefCell<HashMap<Id, TimerRegistration>>,
}

impl<Id: Hash + Eq + Clone + 'static> AppearanceInner<Id> {
    fn complete(&self, id: Id) {
        self.pending.borrow_mut().remove(&id);
        self.appeared.update_if(|appeared| {
            if appeared.contains(&id) {
                return false;
            }
            let mut next = (**appeared).clone();
            next.insert(id);
            *appeared = Rc::new(next);
            true
        });
    }
}

/// Records which ids have finished their entrance delay.
///
/// The appeared set only grows: an id that leaves the live list stays
/// appeared. Liveness is tracked separately from the last
/// [`observe`](Self::observe) call.
pub struct AppearanceScheduler<Id: Clone + 'static> {
    inner: Rc<AppearanceInner<Id>>,
}

impl<Id: Hash + Eq + Clone + 'static> AppearanceScheduler<Id> {
    pub fn new(timers: Timers) -> Self {
        Self::with_delay(timers, APPEAR_DELAY_MILLIS)
    }

    pub fn with_delay(timers: Timers, delay_millis: u64) -> Self {
        Self {
            inner: Rc::new(AppearanceInner {
                timers,
                delay_millis,
                appeared: MutableState::new(Rc::new(IndexSet::new())),
                live: RefCell::new(IndexSet::new()),
                pending: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Takes the current id list and schedules every id that has neither
    /// appeared nor is already waiting. Returns how many were scheduled.
    pub fn observe(&self, ids: &[Id]) -> usize {
        *self.inner.live.borrow_mut() = ids.iter().cloned().collect();

        let mut scheduled = 0;
        for id in ids {
            let waiting = self.inner.pending.borrow().contains_key(id);
            if waiting || self.has_appeared(id) {
                continue;
            }
            let weak: Weak<AppearanceInner<Id>> = Rc::downgrade(&self.inner);
            let fired = id.clone();
            let registration = self.inner.timers.after_millis(self.inner.delay_millis, move || {
                if let Some(inner) = weak.upgrade() {
                    inner.complete(fired);
                }
            });
            self.inner
                .pending
                .borrow_mut()
                .insert(id.clone(), registration);
            scheduled += 1;
        }
        scheduled
    }

    /// The appeared set. Returns the same `Rc` until an id is added.
    pub fn appeared(&self) -> Rc<IndexSet<Id>> {
        self.inner.appeared.value()
    }

    pub fn appeared_state(&self) -> State<Rc<IndexSet<Id>>> {
        self.inner.appeared.as_state()
    }

    pub fn has_appeared(&self, id: &Id) -> bool {
        self.inner.appeared.with(|appeared| appeared.contains(id))
    }

    pub fn is_live(&self, id: &Id) -> bool {
        self.inner.live.borrow().contains(id)
    }

    /// Live and past its delay.
    pub fn is_visible(&self, id: &Id) -> bool {
        self.is_live(id) && self.has_appeared(id)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Drops every waiting timer. Ids already appeared stay appeared.
    pub fn cancel_pending(&self) {
        let pending: Vec<TimerRegistration> = self
            .inner
            .pending
            .borrow_mut()
            .drain()
            .map(|(_, registration)| registration)
            .collect();
        for registration in pending {
            registration.cancel();
        }
    }
}
