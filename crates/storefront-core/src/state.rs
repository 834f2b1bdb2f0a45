use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Watcher<T> = dyn Fn(&T) + 'static;

struct StateInner<T: Clone + 'static> {
    value: RefCell<T>,
    watchers: RefCell<Vec<Weak<Watcher<T>>>>,
}

/// Read-only view of a [`MutableState`].
pub struct State<T: Clone + 'static> {
    inner: Rc<StateInner<T>>,
}

/// Observable single-threaded cell.
///
/// Writers never hold the borrow while subscribers run, so a subscriber may
/// read this state or write any other state, including this one.
pub struct MutableState<T: Clone + 'static> {
    inner: Rc<StateInner<T>>,
}

/// Keeps a subscriber registered. Dropping it unsubscribes.
pub struct Subscription {
    _watcher: Box<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> PartialEq for State<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + 'static> Eq for State<T> {}

impl<T: Clone + 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> PartialEq for MutableState<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + 'static> Eq for MutableState<T> {}

impl<T: Clone + 'static> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> MutableState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StateInner {
                value: RefCell::new(value),
                watchers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn as_state(&self) -> State<T> {
        State {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value)
        };
        self.notify_watchers();
        result
    }

    /// Like [`update`](Self::update), but subscribers only hear about it when
    /// `f` reports a change.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value)
        };
        if changed {
            self.notify_watchers();
        }
        changed
    }

    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.notify_watchers();
    }

    pub fn subscribe(&self, watcher: impl Fn(&T) + 'static) -> Subscription {
        self.as_state().subscribe(watcher)
    }

    fn notify_watchers(&self) {
        let watchers: Vec<Rc<Watcher<T>>> = {
            let mut watchers = self.inner.watchers.borrow_mut();
            watchers.retain(|w| w.strong_count() > 0);
            watchers.iter().filter_map(Weak::upgrade).collect()
        };
        if watchers.is_empty() {
            return;
        }
        let snapshot = self.inner.value.borrow().clone();
        for watcher in watchers {
            watcher(&snapshot);
        }
    }
}

impl<T: Clone + 'static> State<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn subscribe(&self, watcher: impl Fn(&T) + 'static) -> Subscription {
        let watcher: Rc<Watcher<T>> = Rc::new(watcher);
        self.inner.watchers.borrow_mut().push(Rc::downgrade(&watcher));
        Subscription {
            _watcher: Box::new(watcher),
        }
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableState")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn subscribers_see_each_update() {
        let state = MutableState::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = Rc::clone(&seen);
            state.subscribe(move |value| seen.borrow_mut().push(*value))
        };

        state.set(2);
        state.update(|value| *value += 10);

        assert_eq!(*seen.borrow(), vec![2, 12]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let state = MutableState::new(0);
        let hits = Rc::new(Cell::new(0));
        let sub = {
            let hits = Rc::clone(&hits);
            state.subscribe(move |_| hits.set(hits.get() + 1))
        };
        state.set(1);
        drop(sub);
        state.set(2);

        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn update_if_skips_notification_when_unchanged() {
        let state = MutableState::new(5);
        let hits = Rc::new(Cell::new(0));
        let _sub = {
            let hits = Rc::clone(&hits);
            state.subscribe(move |_| hits.set(hits.get() + 1))
        };

        assert!(!state.update_if(|_| false));
        assert!(state.update_if(|value| {
            *value = 6;
            true
        }));

        assert_eq!(hits.get(), 1);
        assert_eq!(state.value(), 6);
    }

    #[test]
    fn subscriber_may_write_back_into_the_same_state() {
        let state = MutableState::new(0);
        let _sub = {
            let writer = state.clone();
            state.subscribe(move |value| {
                if *value == 1 {
                    writer.set(2);
                }
            })
        };

        state.set(1);

        assert_eq!(state.value(), 2);
    }
}
