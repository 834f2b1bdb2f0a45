//! Platform abstraction traits for storefront runtime services.
//!
//! These traits let the runtime delegate wake-ups and time keeping to the
//! host (a browser event loop, a desktop loop, or a test driver) without
//! depending on any of them directly.

/// Schedules work for the runtime.
///
/// Wakers created by the local executor may fire from any thread (an HTTP
/// client completing on a reactor thread, for instance), so implementations
/// must be safe to share across threads.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host drive the runtime again soon.
    fn schedule_frame(&self);
}

/// Provides timing information for the runtime.
pub trait Clock: Send + Sync {
    /// Instant type produced by this clock implementation.
    type Instant: Copy + Send + Sync;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;

    /// Returns the number of milliseconds elapsed since `since`.
    fn elapsed_millis(&self, since: Self::Instant) -> u64;
}

/// Durable key/value storage owned by the host, the way a browser exposes
/// `localStorage`. Values are opaque strings; callers pick the encoding.
pub trait Storage {
    /// Returns the stored value, or `None` when the key was never written.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), crate::StorageError>;

    /// Deletes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), crate::StorageError>;
}
