//! Swipe direction, magnitude and edge-origin computation.
use log::debug;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::config::EngineConfig;
use crate::frame::{Point, ScreenSize};
use crate::session::{LastSwipe, PointerSession};

/// Swipe directions.  The vertical axis points up, so a positive vertical
/// delta is [`SwipeDirection::DownToUp`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum SwipeDirection {
    #[strum(serialize = "right_to_left")]
    RightToLeft,
    #[strum(serialize = "left_to_right")]
    LeftToRight,
    #[strum(serialize = "down_to_up")]
    DownToUp,
    #[strum(serialize = "up_to_down")]
    UpToDown,
}

impl SwipeDirection {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::RightToLeft | Self::LeftToRight)
    }
}

/// A recognized swipe.  Both percentages are in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeOutcome {
    pub direction: SwipeDirection,
    pub magnitude_pct: f64,
    /// Distance of the start point from the edge the swipe came from.
    pub origin_pct: f64,
}

/// What a single-finger swipe resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipeResolution {
    Swipe(SwipeOutcome),
    /// Same direction as the previous swipe, inside the double-swipe window.
    DoubleSwipe(SwipeDirection),
}

#[derive(Debug, Clone)]
pub struct SwipeClassifier {
    horizontal_range_pct: f64,
    vertical_range_pct: f64,
    horizontal_edge_pct: f64,
    vertical_edge_pct: f64,
    edge_origin_gating: bool,
    double_swipe_window: f64,
}

impl SwipeClassifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            horizontal_range_pct: config.horizontal_swipe_range_pct,
            vertical_range_pct: config.vertical_swipe_range_pct,
            horizontal_edge_pct: config.horizontal_edge_threshold_pct,
            vertical_edge_pct: config.vertical_edge_threshold_pct,
            edge_origin_gating: config.edge_origin_gating,
            double_swipe_window: config.double_swipe_window,
        }
    }

    /// Classify the movement from `start` to `current`.
    ///
    /// Returns `None` for tied axes, movement that does not exceed the
    /// threshold of the dominant axis, a degenerate screen axis, or (with
    /// edge-origin gating) a start point too far from the matching edge.
    pub fn classify(&self, start: Point, current: Point, screen: ScreenSize) -> Option<SwipeOutcome> {
        let delta = current - start;
        let (abs_x, abs_y) = (delta.x.abs(), delta.y.abs());

        let direction = if abs_x > abs_y {
            if !exceeds_threshold(abs_x, screen.width, self.horizontal_range_pct) {
                return None;
            }
            if delta.x > 0.0 {
                SwipeDirection::LeftToRight
            } else {
                SwipeDirection::RightToLeft
            }
        } else if abs_y > abs_x {
            if !exceeds_threshold(abs_y, screen.height, self.vertical_range_pct) {
                return None;
            }
            if delta.y > 0.0 {
                SwipeDirection::DownToUp
            } else {
                SwipeDirection::UpToDown
            }
        } else {
            return None;
        };

        let origin_pct = origin_pct(direction, start, screen);
        if self.edge_origin_gating {
            let limit = if direction.is_horizontal() {
                self.horizontal_edge_pct
            } else {
                self.vertical_edge_pct
            };
            if origin_pct > limit {
                debug!("Swipe {direction} rejected: origin {origin_pct:.1}% beyond edge threshold {limit}%");
                return None;
            }
        }

        Some(SwipeOutcome {
            direction,
            magnitude_pct: screen
                .pct_of_width(abs_x)
                .max(screen.pct_of_height(abs_y))
                .clamp(0.0, 100.0),
            origin_pct,
        })
    }

    /// Resolve a single-finger swipe for the session, at most once per span.
    ///
    /// A repeat of the last swipe's direction inside the double-swipe window
    /// yields [`SwipeResolution::DoubleSwipe`] and leaves `last_swipe`
    /// untouched; otherwise `last_swipe` records this swipe.
    pub fn resolve(
        &self,
        session: &mut PointerSession,
        now: f64,
        screen: ScreenSize,
    ) -> Option<SwipeResolution> {
        if session.consumed {
            return None;
        }
        let outcome = self.classify(session.start_position, session.current_position, screen)?;
        session.consumed = true;

        if self.is_double_swipe(session.last_swipe, outcome.direction, now) {
            return Some(SwipeResolution::DoubleSwipe(outcome.direction));
        }
        session.last_swipe = Some(LastSwipe {
            direction: outcome.direction,
            time: now,
        });
        Some(SwipeResolution::Swipe(outcome))
    }

    /// Resolve a multi-finger swipe from the tracked contact's delta.
    /// No double-swipe handling; `last_swipe` is not touched.
    pub fn resolve_multi_finger(
        &self,
        session: &mut PointerSession,
        screen: ScreenSize,
    ) -> Option<SwipeOutcome> {
        if session.consumed {
            return None;
        }
        let outcome = self.classify(session.start_position, session.current_position, screen)?;
        session.consumed = true;
        Some(outcome)
    }

    /// `last` has the same direction and happened within the double-swipe window of `now`.
    pub fn is_double_swipe(&self, last: Option<LastSwipe>, direction: SwipeDirection, now: f64) -> bool {
        last.is_some_and(|last| {
            last.direction == direction && now - last.time <= self.double_swipe_window
        })
    }
}

/// Movement qualifies only if it is strictly beyond `dimension * pct / 100`
/// on a positive, finite screen axis.
fn exceeds_threshold(movement: f64, dimension: f64, pct: f64) -> bool {
    dimension.is_finite() && dimension > 0.0 && movement > dimension * pct / 100.0
}

/// Distance of `start` from the edge implied by `direction`, as a clamped
/// percentage of the matching screen dimension.
pub fn origin_pct(direction: SwipeDirection, start: Point, screen: ScreenSize) -> f64 {
    let pct = match direction {
        SwipeDirection::RightToLeft => screen.pct_of_width(screen.width - start.x),
        SwipeDirection::LeftToRight => screen.pct_of_width(start.x),
        SwipeDirection::DownToUp => screen.pct_of_height(start.y),
        SwipeDirection::UpToDown => screen.pct_of_height(screen.height - start.y),
    };
    pct.clamp(0.0, 100.0)
}
