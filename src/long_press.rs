//! Hold-duration detection.
use crate::session::PointerSession;

#[derive(Debug, Clone)]
pub struct LongPressMonitor {
    duration: f64,
}

impl LongPressMonitor {
    pub fn new(long_press_duration: f64) -> Self {
        Self {
            duration: long_press_duration,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Returns `true` exactly once per span: the first time a held contact
    /// has been down for at least the configured duration.
    pub fn check(&self, session: &mut PointerSession, now: f64) -> bool {
        if !session.held || session.long_press_fired {
            return false;
        }
        if !is_long_pressed(session, now, self.duration) {
            return false;
        }
        session.long_press_fired = true;
        true
    }
}

/// Whether the current span (or the most recent one, once released) has
/// lasted at least `duration` seconds.  Independent of whether the
/// long-press event fired.
pub fn is_long_pressed(session: &PointerSession, now: f64, duration: f64) -> bool {
    session.held_for(now).is_some_and(|held| held >= duration)
}
