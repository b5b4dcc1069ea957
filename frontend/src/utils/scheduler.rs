use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// A callback queued to run later on the UI thread.
pub type Task = Box<dyn FnOnce()>;

/// Cancellation token for a scheduled task. Cancelling after the task has
/// run is a no-op.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle;
}

struct Pending {
    due: Duration,
    handle: TaskHandle,
    task: Task,
}

/// Deterministic scheduler driven by [`VirtualScheduler::advance`].
#[derive(Default)]
pub struct VirtualScheduler {
    now: Cell<Duration>,
    queue: RefCell<Vec<Pending>>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Tasks still waiting to run, cancelled ones excluded.
    pub fn pending(&self) -> usize {
        self.queue
            .borrow()
            .iter()
            .filter(|pending| !pending.handle.is_cancelled())
            .count()
    }

    /// Moves virtual time forward and runs every task that came due, in due
    /// order. Tasks scheduled by a running task are picked up if they also
    /// fall inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(pending) = self.pop_due(target) {
            self.now.set(pending.due);
            if !pending.handle.is_cancelled() {
                (pending.task)();
            }
        }
        self.now.set(target);
    }

    fn pop_due(&self, target: Duration) -> Option<Pending> {
        let mut queue = self.queue.borrow_mut();
        let index = queue
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.due <= target)
            .min_by_key(|(_, pending)| pending.due)
            .map(|(index, _)| index)?;
        Some(queue.remove(index))
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::default();
        self.queue.borrow_mut().push(Pending {
            due: self.now.get() + delay,
            handle: handle.clone(),
            task,
        });
        handle
    }
}

/// Browser scheduler backed by `setTimeout`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutScheduler;

#[cfg(target_arch = "wasm32")]
impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::default();
        let token = handle.clone();
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::callback::Timeout::new(millis, move || {
            if !token.is_cancelled() {
                task();
            }
        })
        .forget();
        handle
    }
}
