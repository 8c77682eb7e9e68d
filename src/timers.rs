use std::time::Duration;

/// Identifies one scheduling of a [`DelayedTask`]. A handle goes stale as
/// soon as the task is rescheduled or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    handle: TaskHandle,
    due: Duration,
    payload: T,
}

/// A single-slot delayed task. Scheduling again replaces whatever was
/// pending, which is what debouncing needs. Time is the caller's clock,
/// measured from app start.
#[derive(Debug, Clone)]
pub struct DelayedTask<T> {
    pending: Option<Pending<T>>,
    next_handle: u64,
}

impl<T> Default for DelayedTask<T> {
    fn default() -> Self {
        Self {
            pending: None,
            next_handle: 0,
        }
    }
}

impl<T> DelayedTask<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Duration, delay: Duration, payload: T) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        self.pending = Some(Pending {
            handle,
            due: now + delay,
            payload,
        });
        handle
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_current(&self, handle: TaskHandle) -> bool {
        self.pending.as_ref().is_some_and(|p| p.handle == handle)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.due)
    }

    pub fn payload(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.payload)
    }

    /// Take the payload if the task is due. Fires at most once per schedule.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some(p) if p.due <= now => self.pending.take().map(|p| p.payload),
            _ => None,
        }
    }
}

/// Earliest of a set of optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Duration>>) -> Option<Duration> {
    deadlines.into_iter().flatten().min()
}
