//! Cancelable fire-once tasks.
//!
//! The debounce timer is expressed against the [`Scheduler`] trait so the
//! controller never touches a clock directly. [`TokioScheduler`] runs tasks
//! on the local tokio task set; [`ManualScheduler`] keeps a virtual clock
//! that only moves when told to, for tests and for hosts that drive time
//! from their own frame loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tokio::task::AbortHandle;

/// A task scheduled to run once.
pub type Task = Box<dyn FnOnce()>;

/// Lifecycle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Scheduled,
    Fired,
    Cancelled,
}

/// Handle to a scheduled task.
///
/// Dropping the handle does not cancel the task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    state: Rc<Cell<TaskState>>,
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    fn new() -> Self {
        Self {
            state: Rc::new(Cell::new(TaskState::Scheduled)),
            abort: None,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state.get()
    }

    pub fn is_pending(&self) -> bool {
        self.state.get() == TaskState::Scheduled
    }

    /// Cancels the task if it has not fired yet.
    pub fn cancel(&self) {
        if self.is_pending() {
            self.state.set(TaskState::Cancelled);
            if let Some(abort) = &self.abort {
                abort.abort();
            }
        }
    }

    /// Runs `task` unless the handle was cancelled or already fired.
    fn fire(&self, task: Task) {
        if self.is_pending() {
            self.state.set(TaskState::Fired);
            task();
        }
    }
}

/// Schedules fire-once tasks after a delay.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle;
}

/// Scheduler backed by `tokio::time::sleep` on the local task set.
///
/// Must be used from within a [`tokio::task::LocalSet`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let mut handle = TaskHandle::new();
        let firing = handle.clone();

        let join = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            firing.fire(task);
        });
        handle.abort = Some(join.abort_handle());

        handle
    }
}

struct ManualTask {
    deadline: Duration,
    seq: u64,
    handle: TaskHandle,
    task: Task,
}

/// Scheduler with a virtual clock.
///
/// Time starts at zero and only moves through [`ManualScheduler::advance`].
/// Due tasks fire in deadline order; tasks with equal deadlines fire in the
/// order they were scheduled.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    tasks: RefCell<Vec<ManualTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed virtual time.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of tasks that are scheduled and not cancelled.
    pub fn pending_count(&self) -> usize {
        self.tasks
            .borrow()
            .iter()
            .filter(|t| t.handle.is_pending())
            .count()
    }

    /// Moves the clock forward, firing every task that falls due.
    ///
    /// Tasks scheduled by a firing task also fire if they fall due within
    /// the same advance.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;

        while let Some(due) = self.take_next_due(target) {
            self.now.set(due.deadline);
            due.handle.fire(due.task);
        }

        self.now.set(target);
    }

    fn take_next_due(&self, target: Duration) -> Option<ManualTask> {
        let mut tasks = self.tasks.borrow_mut();
        tasks.retain(|t| t.handle.is_pending());

        let index = tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= target)
            .min_by_key(|(_, t)| (t.deadline, t.seq))
            .map(|(i, _)| i)?;

        Some(tasks.swap_remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);

        self.tasks.borrow_mut().push(ManualTask {
            deadline: self.now.get() + delay,
            seq,
            handle: handle.clone(),
            task,
        });

        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::task::LocalSet;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &'static str| -> Task {
            let sink = Rc::clone(&sink);
            Box::new(move || sink.borrow_mut().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_manual_task_fires_at_deadline() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        let handle = scheduler.schedule(Duration::from_millis(500), task("a"));

        scheduler.advance(Duration::from_millis(499));
        assert!(log.borrow().is_empty());
        assert!(handle.is_pending());

        scheduler.advance(Duration::from_millis(1));
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(handle.state(), TaskState::Fired);
        assert_eq!(scheduler.now(), Duration::from_millis(500));
    }

    #[test]
    fn test_manual_cancelled_task_never_fires() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        let handle = scheduler.schedule(Duration::from_millis(100), task("a"));
        handle.cancel();

        scheduler.advance(Duration::from_secs(1));
        assert!(log.borrow().is_empty());
        assert_eq!(handle.state(), TaskState::Cancelled);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_manual_tasks_fire_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        scheduler.schedule(Duration::from_millis(300), task("late"));
        scheduler.schedule(Duration::from_millis(100), task("early"));
        scheduler.schedule(Duration::from_millis(100), task("early-second"));

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(*log.borrow(), vec!["early", "early-second", "late"]);
    }

    #[test]
    fn test_manual_task_scheduled_while_firing() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (log, task) = recorder();
        let inner = task("inner");

        let nested = Rc::clone(&scheduler);
        scheduler.schedule(
            Duration::from_millis(100),
            Box::new(move || {
                nested.schedule(Duration::from_millis(100), inner);
            }),
        );

        scheduler.advance(Duration::from_millis(150));
        assert!(log.borrow().is_empty());
        assert_eq!(scheduler.pending_count(), 1);

        scheduler.advance(Duration::from_millis(50));
        assert_eq!(*log.borrow(), vec!["inner"]);
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let scheduler = ManualScheduler::new();
        let (_log, task) = recorder();

        let handle = scheduler.schedule(Duration::ZERO, task("a"));
        scheduler.advance(Duration::ZERO);
        handle.cancel();
        assert_eq!(handle.state(), TaskState::Fired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_after_delay() {
        let (log, task) = recorder();

        LocalSet::new()
            .run_until(async {
                let handle = TokioScheduler::new().schedule(Duration::from_millis(500), task("a"));

                tokio::time::sleep(Duration::from_millis(400)).await;
                assert!(handle.is_pending());

                tokio::time::sleep(Duration::from_millis(200)).await;
                assert_eq!(handle.state(), TaskState::Fired);
            })
            .await;

        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_cancel() {
        let (log, task) = recorder();

        LocalSet::new()
            .run_until(async {
                let handle = TokioScheduler::new().schedule(Duration::from_millis(500), task("a"));
                handle.cancel();

                tokio::time::sleep(Duration::from_secs(1)).await;
                assert_eq!(handle.state(), TaskState::Cancelled);
            })
            .await;

        assert!(log.borrow().is_empty());
    }
}
