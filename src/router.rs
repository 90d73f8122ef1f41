//! Picks single- or multi-finger event variants from the pointer count.
use log::debug;

use crate::sink::GestureEvent;
use crate::swipe::{SwipeOutcome, SwipeResolution};
use crate::tap::TapKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerMode {
    /// One contact, or the pointer-emulation path (count 0).
    Single,
    Two,
    Three,
}

impl FingerMode {
    /// Counts above three route as three-finger.
    pub fn from_count(pointer_count: u32) -> Self {
        match pointer_count {
            0 | 1 => Self::Single,
            2 => Self::Two,
            _ => Self::Three,
        }
    }

    pub fn is_multi(self) -> bool {
        self != Self::Single
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MultiTouchRouter;

impl MultiTouchRouter {
    pub fn new() -> Self {
        Self
    }

    pub fn long_press(&self, mode: FingerMode) -> GestureEvent {
        match mode {
            FingerMode::Single => GestureEvent::LongPress,
            FingerMode::Two => GestureEvent::TwoFingerLongPress,
            FingerMode::Three => GestureEvent::ThreeFingerLongPress,
        }
    }

    pub fn swipe(&self, resolution: SwipeResolution) -> GestureEvent {
        match resolution {
            SwipeResolution::Swipe(outcome) => GestureEvent::Swipe(outcome),
            SwipeResolution::DoubleSwipe(direction) => GestureEvent::DoubleSwipe(direction),
        }
    }

    /// Multi-finger swipe variant.  `None` for [`FingerMode::Single`].
    pub fn multi_finger_swipe(&self, mode: FingerMode, outcome: SwipeOutcome) -> Option<GestureEvent> {
        match mode {
            FingerMode::Single => None,
            FingerMode::Two => Some(GestureEvent::TwoFingerSwipe {
                direction: outcome.direction,
                origin_pct: outcome.origin_pct,
            }),
            FingerMode::Three => Some(GestureEvent::ThreeFingerSwipe {
                direction: outcome.direction,
                origin_pct: outcome.origin_pct,
            }),
        }
    }

    /// Single-finger tap resolutions are dropped for multi-finger spans.
    pub fn tap(&self, mode: FingerMode, kind: TapKind) -> Option<GestureEvent> {
        if mode.is_multi() {
            debug!("Suppressed {kind} tap from a multi-finger contact");
            return None;
        }
        Some(match kind {
            TapKind::Single => GestureEvent::SingleTap,
            TapKind::Double => GestureEvent::DoubleTap,
            TapKind::Triple => GestureEvent::TripleTap,
        })
    }

    /// Multi-finger tap variant, decided when the contact lifts.
    pub fn multi_finger_tap(&self, mode: FingerMode) -> Option<GestureEvent> {
        match mode {
            FingerMode::Single => None,
            FingerMode::Two => Some(GestureEvent::TwoFingerTap),
            FingerMode::Three => Some(GestureEvent::ThreeFingerTap),
        }
    }
}
