//! Mutable state for the contact currently (or most recently) on screen.
use crate::frame::Point;
use crate::swipe::SwipeDirection;

/// The most recent regular swipe, kept across contacts for double-swipe detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastSwipe {
    pub direction: SwipeDirection,
    pub time: f64,
}

/// Per-contact tracking state.  One instance lives for the whole engine
/// lifetime; [`PointerSession::begin`] re-initializes the per-span fields.
#[derive(Debug, Clone, Default)]
pub struct PointerSession {
    pub start_position: Point,
    pub current_position: Point,
    pub session_start_time: Option<f64>,
    /// Release time of the last span; `None` while a contact is held.
    pub session_end_time: Option<f64>,
    pub held: bool,
    /// A gesture was emitted for this span; no further swipe is evaluated.
    pub consumed: bool,
    pub long_press_fired: bool,
    pub pointer_count: u32,
    /// Highest pointer count observed since the span began.
    pub peak_pointer_count: u32,

    pub last_swipe: Option<LastSwipe>,
    pub tap_count: u8,
    pub last_tap_time: Option<f64>,
}

impl PointerSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new span.  Tap and swipe history survive.
    pub fn begin(&mut self, position: Point, now: f64, pointer_count: u32) {
        self.start_position = position;
        self.current_position = position;
        self.session_start_time = Some(now);
        self.session_end_time = None;
        self.held = true;
        self.consumed = false;
        self.long_press_fired = false;
        self.pointer_count = pointer_count;
        self.peak_pointer_count = pointer_count;
    }

    pub fn update(&mut self, position: Point, pointer_count: u32) {
        self.current_position = position;
        self.pointer_count = pointer_count;
        self.peak_pointer_count = self.peak_pointer_count.max(pointer_count);
    }

    pub fn end(&mut self, now: f64) {
        self.held = false;
        self.session_end_time = Some(now);
    }

    /// `current_position - start_position`.
    pub fn delta(&self) -> Point {
        self.current_position - self.start_position
    }

    /// Seconds the current contact has been held, or the full length of the
    /// most recent span once released.  `None` before the first contact.
    pub fn held_for(&self, now: f64) -> Option<f64> {
        let start = self.session_start_time?;
        Some(self.session_end_time.unwrap_or(now) - start)
    }
}
