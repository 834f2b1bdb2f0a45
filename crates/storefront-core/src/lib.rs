#![doc = r"Core runtime pieces for the storefront state engine."]

pub mod context;
pub mod effect;
pub mod error;
pub mod platform;
pub mod runtime;
pub mod state;
pub mod storage;
pub mod timer;

pub use context::LocalContext;
pub use effect::{EffectCleanup, EffectScope, KeyedEffect};
pub use error::{CoreError, StorageError};
pub use platform::{Clock, RuntimeScheduler, Storage};
pub use runtime::{Runtime, RuntimeHandle};
pub use state::{MutableState, State, Subscription};
pub use storage::MemoryStorage;
pub use timer::{TimerRegistration, Timers};

#[cfg(test)]
pub use runtime::{TestRuntime, TestScheduler};

pub type TaskId = u64;
pub type TimerId = u64;

/// Map types plus the hasher used for effect keys. `std-hash` swaps both to
/// the standard library.
#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::HashMap;

    pub(crate) type KeyHasher = std::collections::hash_map::DefaultHasher;
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use hashbrown::HashMap;

    /// Fixed-key `AHasher`, so equal keys hash equally across effect runs.
    pub(crate) type KeyHasher = ahash::AHasher;
}
