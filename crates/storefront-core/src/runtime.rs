use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures_task::{waker, ArcWake};

use crate::map::HashMap;
use crate::platform::RuntimeScheduler;
use crate::timer::Timers;
use crate::{TaskId, TimerId};

type LocalTask = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Task ids woken since the last drain. Shared with wakers, which may fire
/// from another thread.
struct ReadyQueue {
    ids: Mutex<VecDeque<TaskId>>,
    scheduler: Arc<dyn RuntimeScheduler>,
}

impl ReadyQueue {
    fn push(&self, id: TaskId) {
        if let Ok(mut ids) = self.ids.lock() {
            if !ids.contains(&id) {
                ids.push_back(id);
            }
        }
        self.scheduler.schedule_frame();
    }

    fn take_all(&self) -> Vec<TaskId> {
        self.ids
            .lock()
            .map(|mut ids| ids.drain(..).collect())
            .unwrap_or_default()
    }

    fn is_empty(&self) -> bool {
        self.ids.lock().map(|ids| ids.is_empty()).unwrap_or(true)
    }
}

struct TaskWaker {
    id: TaskId,
    ready: Arc<ReadyQueue>,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.ready.push(arc_self.id);
    }
}

struct TimerEntry {
    id: TimerId,
    due_millis: u64,
    callback: Box<dyn FnOnce() + 'static>,
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    pending_tasks: RefCell<VecDeque<Box<dyn FnOnce() + 'static>>>,
    futures: RefCell<HashMap<TaskId, LocalTask>>,
    ready: Arc<ReadyQueue>,
    next_task_id: Cell<TaskId>,
    timers: RefCell<VecDeque<TimerEntry>>, // kept sorted by (due_millis, id)
    next_timer_id: Cell<TimerId>,
    now_millis: Cell<u64>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            ready: Arc::new(ReadyQueue {
                ids: Mutex::new(VecDeque::new()),
                scheduler: Arc::clone(&scheduler),
            }),
            scheduler,
            pending_tasks: RefCell::new(VecDeque::new()),
            futures: RefCell::new(HashMap::new()),
            next_task_id: Cell::new(1),
            timers: RefCell::new(VecDeque::new()),
            next_timer_id: Cell::new(1),
            now_millis: Cell::new(0),
        }
    }

    fn enqueue_task(&self, task: Box<dyn FnOnce() + 'static>) {
        self.pending_tasks.borrow_mut().push_back(task);
        self.scheduler.schedule_frame();
    }

    fn spawn_local(&self, future: LocalTask) -> TaskId {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        self.futures.borrow_mut().insert(id, future);
        self.ready.push(id);
        id
    }

    fn poll_task(&self, id: TaskId) {
        let Some(mut future) = self.futures.borrow_mut().remove(&id) else {
            return;
        };
        let task_waker = waker(Arc::new(TaskWaker {
            id,
            ready: Arc::clone(&self.ready),
        }));
        let mut cx = Context::from_waker(&task_waker);
        if let Poll::Pending = future.as_mut().poll(&mut cx) {
            self.futures.borrow_mut().insert(id, future);
        }
    }

    fn drain_tasks(&self) {
        loop {
            let tasks: Vec<Box<dyn FnOnce() + 'static>> =
                self.pending_tasks.borrow_mut().drain(..).collect();
            let ready = self.ready.take_all();
            if tasks.is_empty() && ready.is_empty() {
                break;
            }
            for task in tasks {
                task();
            }
            for id in ready {
                self.poll_task(id);
            }
        }
    }

    fn has_tasks(&self) -> bool {
        !self.pending_tasks.borrow().is_empty() || !self.ready.is_empty()
    }

    fn in_flight(&self) -> usize {
        self.futures.borrow().len()
    }

    fn register_timer(&self, delay_millis: u64, callback: Box<dyn FnOnce() + 'static>) -> TimerId {
        let id = self.next_timer_id.get();
        self.next_timer_id.set(id + 1);
        let due_millis = self.now_millis.get().saturating_add(delay_millis);
        let mut timers = self.timers.borrow_mut();
        let index = timers
            .iter()
            .position(|entry| entry.due_millis > due_millis)
            .unwrap_or(timers.len());
        timers.insert(
            index,
            TimerEntry {
                id,
                due_millis,
                callback,
            },
        );
        drop(timers);
        self.scheduler.schedule_frame();
        id
    }

    fn cancel_timer(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|entry| entry.id != id);
    }

    fn next_timer_deadline(&self) -> Option<u64> {
        self.timers.borrow().front().map(|entry| entry.due_millis)
    }

    fn drain_timers(&self, now_millis: u64) {
        if now_millis > self.now_millis.get() {
            self.now_millis.set(now_millis);
        }
        let now = self.now_millis.get();
        loop {
            let due = {
                let mut timers = self.timers.borrow_mut();
                match timers.front() {
                    Some(entry) if entry.due_millis <= now => timers.pop_front(),
                    _ => None,
                }
            };
            match due {
                Some(entry) => (entry.callback)(),
                None => break,
            }
        }
    }
}

/// Owner of the runtime queues. Dropping the last `Runtime` clone turns every
/// outstanding [`RuntimeHandle`] into a no-op.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn timers(&self) -> Timers {
        Timers::new(self.handle())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct TestScheduler;

#[cfg(test)]
impl RuntimeScheduler for TestScheduler {
    fn schedule_frame(&self) {}
}

#[cfg(test)]
pub struct TestRuntime {
    runtime: Runtime,
}

#[cfg(test)]
impl TestRuntime {
    pub fn new() -> Self {
        Self {
            runtime: Runtime::new(Arc::new(TestScheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }
}

/// Weak handle to a [`Runtime`].
///
/// Every operation silently does nothing once the runtime is gone; work
/// spawned through a dead handle is dropped without running.
#[derive(Clone)]
pub struct RuntimeHandle(pub(crate) Weak<RuntimeInner>);

impl RuntimeHandle {
    pub fn spawn_task(&self, task: impl FnOnce() + 'static) {
        match self.0.upgrade() {
            Some(inner) => inner.enqueue_task(Box::new(task)),
            None => log::debug!("runtime gone; dropping queued task"),
        }
    }

    /// Registers a `!Send` future with the local executor. It is first polled
    /// on the next [`drain_tasks`](Self::drain_tasks).
    pub fn spawn_local(&self, future: impl Future<Output = ()> + 'static) -> Option<TaskId> {
        match self.0.upgrade() {
            Some(inner) => Some(inner.spawn_local(Box::pin(future))),
            None => {
                log::debug!("runtime gone; dropping future");
                None
            }
        }
    }

    pub fn drain_tasks(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.drain_tasks();
        }
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.has_tasks())
            .unwrap_or(false)
    }

    /// Number of spawned futures that have not completed yet.
    pub fn in_flight_tasks(&self) -> usize {
        self.0
            .upgrade()
            .map(|inner| inner.in_flight())
            .unwrap_or(0)
    }

    pub fn register_timer(
        &self,
        delay_millis: u64,
        callback: impl FnOnce() + 'static,
    ) -> Option<TimerId> {
        self.0
            .upgrade()
            .map(|inner| inner.register_timer(delay_millis, Box::new(callback)))
    }

    pub fn cancel_timer(&self, id: TimerId) {
        if let Some(inner) = self.0.upgrade() {
            inner.cancel_timer(id);
        }
    }

    pub fn has_pending_timers(&self) -> bool {
        self.next_timer_deadline().is_some()
    }

    pub fn next_timer_deadline(&self) -> Option<u64> {
        self.0.upgrade().and_then(|inner| inner.next_timer_deadline())
    }

    /// Fires every timer due at or before `now_millis`. Time never moves
    /// backwards; an earlier `now_millis` than the last one is ignored.
    pub fn drain_timers(&self, now_millis: u64) {
        if let Some(inner) = self.0.upgrade() {
            inner.drain_timers(now_millis);
        }
    }

    pub fn timers(&self) -> Timers {
        Timers::new(self.clone())
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
