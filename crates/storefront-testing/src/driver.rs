use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use storefront_core::{Runtime, RuntimeHandle, RuntimeScheduler, Timers};

#[derive(Debug, Default)]
pub struct CountingScheduler {
    frames: AtomicUsize,
}

impl CountingScheduler {
    pub fn frame_requests(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

impl RuntimeScheduler for CountingScheduler {
    fn schedule_frame(&self) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }
}

/// Owns a runtime and drives it with manual time.
pub struct RuntimeDriver {
    runtime: Runtime,
    scheduler: Arc<CountingScheduler>,
    now_millis: Cell<u64>,
}

impl RuntimeDriver {
    pub fn new() -> Self {
        let scheduler = Arc::new(CountingScheduler::default());
        Self {
            runtime: Runtime::new(scheduler.clone()),
            scheduler,
            now_millis: Cell::new(0),
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn timers(&self) -> Timers {
        self.runtime.timers()
    }

    pub fn now_millis(&self) -> u64 {
        self.now_millis.get()
    }

    pub fn frame_requests(&self) -> usize {
        self.scheduler.frame_requests()
    }

    /// Runs queued tasks and ready futures until nothing is left to do.
    pub fn settle(&self) {
        self.runtime.handle().drain_tasks();
    }

    /// Moves time forward, fires due timers, then settles.
    pub fn advance(&self, millis: u64) {
        let now = self.now_millis.get() + millis;
        self.now_millis.set(now);
        let handle = self.runtime.handle();
        handle.drain_timers(now);
        handle.drain_tasks();
    }
}

impl Default for RuntimeDriver {
    fn default() -> Self {
        Self::new()
    }
}
