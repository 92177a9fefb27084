//! [`SharedRobot`] – serialised access to one [`Robot`] from many threads.
//!
//! Every call takes the same lock, so mutating operations (`walk`,
//! `store_object`, `grip`, `release`, `trigger_emergency_stop`) never
//! interleave and a reader never sees a half-applied move.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::error;

use crate::robot::Robot;

#[derive(Clone)]
pub struct SharedRobot {
    inner: Arc<Mutex<Robot>>,
}

impl SharedRobot {
    pub fn new(robot: Robot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(robot)),
        }
    }

    /// Run `f` with exclusive access to the robot.
    ///
    /// A poisoned lock is recovered: the robot's own invariants hold between
    /// calls, so the state left by a panicking holder is still consistent.
    pub fn with<T>(&self, f: impl FnOnce(&mut Robot) -> T) -> T {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Latch the emergency stop.  Safe to call from a signal-handler thread.
    pub fn emergency_stop(&self) {
        self.with(Robot::trigger_emergency_stop);
    }

    fn lock(&self) -> MutexGuard<'_, Robot> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            error!("robot lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }
}
