//! Keyed side effects for code that reacts to state transitions.
//!
//! A [`KeyedEffect`] runs its body whenever the hash of its keys changes,
//! disposing the previous run first. It is the explicit replacement for
//! effects that would otherwise re-run implicitly on every render.

use std::cell::Cell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::map::KeyHasher;

fn key_of<K: Hash + ?Sized>(keys: &K) -> u64 {
    let mut hasher = KeyHasher::default();
    keys.hash(&mut hasher);
    hasher.finish()
}

/// Handed to an effect body; reports whether that run is still current.
#[derive(Clone)]
pub struct EffectScope {
    active: Rc<Cell<bool>>,
}

impl EffectScope {
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

#[derive(Default)]
pub struct EffectCleanup {
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl EffectCleanup {
    pub fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            cleanup: Some(Box::new(cleanup)),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    fn into_cleanup(self) -> Option<Box<dyn FnOnce()>> {
        self.cleanup
    }
}

#[derive(Default)]
pub struct KeyedEffect {
    key: Option<u64>,
    active: Option<Rc<Cell<bool>>>,
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl KeyedEffect {
    pub fn new() -> Self {
        Self::default()
    }

    fn should_run(&self, key: u64) -> bool {
        match self.key {
            Some(current) => current != key,
            None => true,
        }
    }

    /// Runs `effect` if `keys` hash differently from the previous run.
    /// Returns whether the body ran.
    pub fn run<K: Hash + ?Sized>(
        &mut self,
        keys: &K,
        effect: impl FnOnce(EffectScope) -> EffectCleanup,
    ) -> bool {
        let key = key_of(keys);
        if !self.should_run(key) {
            return false;
        }
        self.run_cleanup();
        self.key = Some(key);
        let active = Rc::new(Cell::new(true));
        self.active = Some(Rc::clone(&active));
        self.cleanup = effect(EffectScope { active }).into_cleanup();
        true
    }

    /// Disposes the current run and forgets its key, so the next
    /// [`run`](Self::run) always executes.
    pub fn dispose(&mut self) {
        self.run_cleanup();
        self.key = None;
    }

    fn run_cleanup(&mut self) {
        if let Some(active) = self.active.take() {
            active.set(false);
        }
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl Drop for KeyedEffect {
    fn drop(&mut self) {
        self.run_cleanup();
    }
}
