//! Debounce timer.
//!
//! Coalesces rapid triggers into one action that runs after a quiet period.
//! At most one timer is live: arming cancels whatever was armed before.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::scheduler::{Scheduler, TaskHandle};

/// Default quiet period before a forward conversion fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A cancel-on-replace timer on top of a [`Scheduler`].
pub struct Debouncer {
    scheduler: Rc<dyn Scheduler>,
    delay: Duration,
    pending: RefCell<Option<TaskHandle>>,
}

impl Debouncer {
    pub fn new(scheduler: Rc<dyn Scheduler>, delay: Duration) -> Self {
        Self {
            scheduler,
            delay,
            pending: RefCell::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms the timer, replacing any armed action.
    pub fn arm(&self, action: impl FnOnce() + 'static) {
        self.cancel();
        let handle = self.scheduler.schedule(self.delay, Box::new(action));
        *self.pending.borrow_mut() = Some(handle);
    }

    /// Cancels the armed action. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        match self.pending.borrow_mut().take() {
            Some(handle) => {
                let was_pending = handle.is_pending();
                handle.cancel();
                was_pending
            }
            None => false,
        }
    }

    /// Whether an armed action is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .is_some_and(TaskHandle::is_pending)
    }
}
