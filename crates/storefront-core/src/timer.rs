use crate::runtime::RuntimeHandle;
use crate::TimerId;

/// One-shot delayed callbacks measured against the runtime's clock.
#[derive(Clone)]
pub struct Timers {
    runtime: RuntimeHandle,
}

impl Timers {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    pub fn after_millis(
        &self,
        delay_millis: u64,
        callback: impl FnOnce() + 'static,
    ) -> TimerRegistration {
        let runtime = self.runtime.clone();
        match runtime.register_timer(delay_millis, callback) {
            Some(id) => TimerRegistration::new(runtime, id),
            None => TimerRegistration::inactive(runtime),
        }
    }
}

/// Keeps a pending timer alive. Dropping it cancels the timer if it has not
/// fired yet.
pub struct TimerRegistration {
    runtime: RuntimeHandle,
    id: Option<TimerId>,
}

impl TimerRegistration {
    fn new(runtime: RuntimeHandle, id: TimerId) -> Self {
        Self {
            runtime,
            id: Some(id),
        }
    }

    fn inactive(runtime: RuntimeHandle) -> Self {
        Self { runtime, id: None }
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_timer(id);
        }
    }
}

impl Drop for TimerRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_timer(id);
        }
    }
}
