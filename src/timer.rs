//! Cancellable deferred actions on the engine's logical timeline.
//!
//! Each scheduled action gets its own [`TimerHandle`]; cancelling a handle
//! removes exactly that action and nothing else.  Actions never run on
//! their own: the owner pops them when it observes that time has passed.
use log::trace;

/// Opaque token identifying one scheduled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TimerHandle,
    deadline: f64,
    action: T,
}

/// Pending actions ordered by deadline, ties broken by scheduling order.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to become due at `deadline`.
    pub fn schedule(&mut self, deadline: f64, action: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;

        // Insert after every entry with an earlier or equal deadline.
        let index = self.entries.partition_point(|e| e.deadline <= deadline);
        self.entries.insert(
            index,
            Entry {
                handle,
                deadline,
                action,
            },
        );
        trace!("Scheduled timer {} at {deadline:.3}", handle.0);
        handle
    }

    /// Cancel one pending action.  Returns `false` if it already fired or
    /// was cancelled before.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.entries.iter().position(|e| e.handle == handle) {
            Some(index) => {
                self.entries.remove(index);
                trace!("Cancelled timer {}", handle.0);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<f64> {
        self.entries.first().map(|e| e.deadline)
    }

    /// Remove and return, in deadline order, every action whose deadline is
    /// strictly before `now`.
    pub fn pop_expired(&mut self, now: f64) -> Vec<(TimerHandle, T)> {
        self.pop_while(|deadline| deadline < now)
    }

    /// Remove and return, in deadline order, every action whose deadline is
    /// at or before `now`.
    pub fn pop_due(&mut self, now: f64) -> Vec<(TimerHandle, T)> {
        self.pop_while(|deadline| deadline <= now)
    }

    fn pop_while(&mut self, is_due: impl Fn(f64) -> bool) -> Vec<(TimerHandle, T)> {
        let count = self.entries.iter().take_while(|e| is_due(e.deadline)).count();
        self.entries
            .drain(..count)
            .map(|e| (e.handle, e.action))
            .collect()
    }
}
