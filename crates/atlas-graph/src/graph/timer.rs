//! Scheduled tasks - cancelable, deterministic timers
//!
//! The engine never spawns threads or reads the clock. Callers pass the current
//! time in milliseconds and poll each frame; a task fires at most once per
//! schedule. Scheduling while already pending replaces the deadline (debounce).

/// A single pending task carrying a payload delivered when it fires
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask<T = ()> {
    due_ms: Option<u64>,
    payload: Option<T>,
}

impl<T> Default for ScheduledTask<T> {
    fn default() -> Self {
        Self {
            due_ms: None,
            payload: None,
        }
    }
}

impl<T> ScheduledTask<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule (or reschedule) the task to fire `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, payload: T) {
        self.due_ms = Some(now_ms.saturating_add(delay_ms));
        self.payload = Some(payload);
    }

    /// Drop the pending task. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.payload = None;
        self.due_ms.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.due_ms.is_some()
    }

    pub fn due_at(&self) -> Option<u64> {
        self.due_ms
    }

    /// Fire the task if its deadline has passed
    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        match self.due_ms {
            Some(due) if now_ms >= due => {
                self.due_ms = None;
                self.payload.take()
            }
            _ => None,
        }
    }
}
