//! `std` services for hosting the storefront runtime on a desktop or
//! server thread: frame signalling that can be poked from I/O threads, a
//! monotonic clock, and JSON file storage.

mod file_storage;

pub use file_storage::FileStorage;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use storefront_core::{Clock, Runtime, RuntimeHandle, RuntimeScheduler, Timers};

pub type FrameWaker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Latches frame requests for the host loop. Wakers fire on the thread that
/// completed the I/O, so the host can sleep between frames.
#[derive(Default)]
pub struct StdScheduler {
    pending: AtomicBool,
    waker: RwLock<Option<FrameWaker>>,
}

impl StdScheduler {
    pub fn take_frame_request(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }

    pub fn set_frame_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        match self.waker.write() {
            Ok(mut slot) => *slot = Some(Arc::new(waker)),
            Err(_) => log::warn!("frame waker lock poisoned; waker not installed"),
        }
    }

    pub fn clear_frame_waker(&self) {
        if let Ok(mut slot) = self.waker.write() {
            slot.take();
        }
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_waker = self.waker.read().map(|slot| slot.is_some()).unwrap_or(false);
        f.debug_struct("StdScheduler")
            .field("pending", &self.pending.load(Ordering::SeqCst))
            .field("has_waker", &has_waker)
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_frame(&self) {
        self.pending.store(true, Ordering::SeqCst);
        let waker = self.waker.read().ok().and_then(|slot| slot.clone());
        if let Some(waker) = waker {
            waker();
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed_millis(&self, since: Instant) -> u64 {
        u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// A [`Runtime`] wired to [`StdScheduler`], with time measured in
/// milliseconds since construction.
pub struct StdRuntime {
    runtime: Runtime,
    scheduler: Arc<StdScheduler>,
    clock: StdClock,
    started_at: Instant,
}

impl StdRuntime {
    pub fn new() -> Self {
        let scheduler = Arc::new(StdScheduler::default());
        let clock = StdClock;
        Self {
            runtime: Runtime::new(scheduler.clone()),
            scheduler,
            started_at: clock.now(),
            clock,
        }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn timers(&self) -> Timers {
        self.runtime.timers()
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.clock.elapsed_millis(self.started_at)
    }

    pub fn take_frame_request(&self) -> bool {
        self.scheduler.take_frame_request()
    }

    pub fn set_frame_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_frame_waker(waker);
    }

    pub fn clear_frame_waker(&self) {
        self.scheduler.clear_frame_waker();
    }

    /// Fires timers due by `now_millis`, then drains tasks and ready
    /// futures until nothing is runnable.
    pub fn drive(&self, now_millis: u64) {
        let handle = self.runtime.handle();
        handle.drain_timers(now_millis);
        handle.drain_tasks();
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .field("elapsed_millis", &self.elapsed_millis())
            .finish()
    }
}
