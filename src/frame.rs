//! Normalized per-tick input: the only thing the engine consumes.
use log::warn;

/// Lifecycle of one continuous contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Began,
    Moved,
    Ended,
}

/// A 2D position in screen units.  The vertical axis points up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Reference screen dimensions used to turn distances into percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `value / width * 100`, or 0 when the width is not a usable positive number.
    pub fn pct_of_width(&self, value: f64) -> f64 {
        pct_of(value, self.width)
    }

    /// `value / height * 100`, or 0 when the height is not a usable positive number.
    pub fn pct_of_height(&self, value: f64) -> f64 {
        pct_of(value, self.height)
    }
}

fn pct_of(value: f64, dimension: f64) -> f64 {
    if dimension.is_finite() && dimension > 0.0 {
        value / dimension * 100.0
    } else {
        0.0
    }
}

/// One sample from the input driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerFrame {
    pub position: Point,
    pub phase: PointerPhase,
    pub pointer_count: u32,
}

impl PointerFrame {
    pub const fn new(position: Point, phase: PointerPhase, pointer_count: u32) -> Self {
        Self {
            position,
            phase,
            pointer_count,
        }
    }

    pub const fn began(x: f64, y: f64, pointer_count: u32) -> Self {
        Self::new(Point::new(x, y), PointerPhase::Began, pointer_count)
    }

    pub const fn moved(x: f64, y: f64, pointer_count: u32) -> Self {
        Self::new(Point::new(x, y), PointerPhase::Moved, pointer_count)
    }

    pub const fn ended(x: f64, y: f64, pointer_count: u32) -> Self {
        Self::new(Point::new(x, y), PointerPhase::Ended, pointer_count)
    }

    /// Build a frame from driver values that have not been checked yet.
    ///
    /// Negative pointer counts clamp to 0; non-finite coordinates reject
    /// the whole frame.
    pub fn from_raw(x: f64, y: f64, phase: PointerPhase, pointer_count: i64) -> Option<Self> {
        let position = Point::new(x, y);
        if !position.is_finite() {
            warn!("Dropping pointer frame with non-finite position ({x}, {y})");
            return None;
        }
        let pointer_count = u32::try_from(pointer_count.max(0)).unwrap_or(u32::MAX);
        Some(Self::new(position, phase, pointer_count))
    }

    /// A frame is usable when its position is finite.
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
    }
}
