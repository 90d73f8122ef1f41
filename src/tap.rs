//! Tap counting with deferred confirmation.
//!
//! A single tap can only be confirmed once the tap window has passed without
//! another contact-down, so single and double taps are resolved by timers.
//! A third contact-down inside the window resolves immediately.
use log::{debug, trace};
use strum::Display;

use crate::session::PointerSession;
use crate::timer::{TimerHandle, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TapKind {
    #[strum(serialize = "single")]
    Single,
    #[strum(serialize = "double")]
    Double,
    #[strum(serialize = "triple")]
    Triple,
}

#[derive(Debug, Clone)]
pub struct TapClassifier {
    window: f64,
    timers: TimerQueue<TapKind>,
    pending_single: Option<TimerHandle>,
    pending_double: Option<TimerHandle>,
}

impl TapClassifier {
    pub fn new(tap_window: f64) -> Self {
        Self {
            window: tap_window,
            timers: TimerQueue::new(),
            pending_single: None,
            pending_double: None,
        }
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    /// Whether a single- or double-tap resolution is still waiting.
    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Count a contact-down at `now`.  Returns [`TapKind::Triple`] when the
    /// third tap of a streak lands; single and double taps resolve later
    /// through [`TapClassifier::pop_expired`] / [`TapClassifier::pop_due`].
    pub fn on_contact_down(&mut self, session: &mut PointerSession, now: f64) -> Option<TapKind> {
        let in_window = session
            .last_tap_time
            .is_some_and(|last| now - last <= self.window);
        session.tap_count = if in_window {
            session.tap_count.saturating_add(1)
        } else {
            1
        };
        session.last_tap_time = Some(now);
        trace!("Contact down at {now:.3}, tap count {}", session.tap_count);

        match session.tap_count {
            1 => {
                self.cancel_single();
                self.pending_single = Some(self.timers.schedule(now + self.window, TapKind::Single));
                None
            }
            2 => {
                self.cancel_single();
                self.cancel_double();
                self.pending_double = Some(self.timers.schedule(now + self.window, TapKind::Double));
                None
            }
            _ => {
                self.cancel_single();
                self.cancel_double();
                session.tap_count = 0;
                debug!("Triple tap");
                Some(TapKind::Triple)
            }
        }
    }

    /// Resolutions whose deadline is strictly before `now`.
    pub fn pop_expired(&mut self, session: &PointerSession, now: f64) -> Vec<TapKind> {
        let fired = self.timers.pop_expired(now);
        self.confirm(session, fired)
    }

    /// Resolutions whose deadline is at or before `now`.
    pub fn pop_due(&mut self, session: &PointerSession, now: f64) -> Vec<TapKind> {
        let fired = self.timers.pop_due(now);
        self.confirm(session, fired)
    }

    /// A fired timer only counts if the streak is still at the count it was
    /// scheduled for.
    fn confirm(&mut self, session: &PointerSession, fired: Vec<(TimerHandle, TapKind)>) -> Vec<TapKind> {
        fired
            .into_iter()
            .filter_map(|(handle, kind)| {
                if self.pending_single == Some(handle) {
                    self.pending_single = None;
                }
                if self.pending_double == Some(handle) {
                    self.pending_double = None;
                }
                let expected = match kind {
                    TapKind::Single => 1,
                    TapKind::Double => 2,
                    TapKind::Triple => 3,
                };
                (session.tap_count == expected).then_some(kind)
            })
            .collect()
    }

    fn cancel_single(&mut self) {
        if let Some(handle) = self.pending_single.take() {
            self.timers.cancel(handle);
        }
    }

    fn cancel_double(&mut self) {
        if let Some(handle) = self.pending_double.take() {
            self.timers.cancel(handle);
        }
    }
}
