//! Gesture events and the listener registry the engine publishes to.
//!
//! Every event kind has its own typed listener list.  Registering nothing
//! is fine: events with no listeners are simply dropped.
use strum::{Display, EnumString, IntoStaticStr};

use crate::swipe::{SwipeDirection, SwipeOutcome};

/// Event kinds, named as they appear in config gesture tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum GestureKind {
    #[strum(serialize = "single_tap")]
    SingleTap,
    #[strum(serialize = "double_tap")]
    DoubleTap,
    #[strum(serialize = "triple_tap")]
    TripleTap,
    #[strum(serialize = "long_press")]
    LongPress,
    #[strum(serialize = "swipe")]
    Swipe,
    #[strum(serialize = "double_swipe")]
    DoubleSwipe,
    #[strum(serialize = "two_finger_swipe")]
    TwoFingerSwipe,
    #[strum(serialize = "three_finger_swipe")]
    ThreeFingerSwipe,
    #[strum(serialize = "two_finger_tap")]
    TwoFingerTap,
    #[strum(serialize = "three_finger_tap")]
    ThreeFingerTap,
    #[strum(serialize = "two_finger_long_press")]
    TwoFingerLongPress,
    #[strum(serialize = "three_finger_long_press")]
    ThreeFingerLongPress,
}

impl GestureKind {
    /// Publication order inside one tick: long-press, then swipes, then taps.
    pub fn emission_rank(self) -> u8 {
        match self {
            Self::LongPress | Self::TwoFingerLongPress | Self::ThreeFingerLongPress => 0,
            Self::Swipe | Self::DoubleSwipe | Self::TwoFingerSwipe | Self::ThreeFingerSwipe => 1,
            Self::SingleTap
            | Self::DoubleTap
            | Self::TripleTap
            | Self::TwoFingerTap
            | Self::ThreeFingerTap => 2,
        }
    }
}

/// A recognized gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    SingleTap,
    DoubleTap,
    TripleTap,
    LongPress,
    Swipe(SwipeOutcome),
    DoubleSwipe(SwipeDirection),
    TwoFingerSwipe {
        direction: SwipeDirection,
        origin_pct: f64,
    },
    ThreeFingerSwipe {
        direction: SwipeDirection,
        origin_pct: f64,
    },
    TwoFingerTap,
    ThreeFingerTap,
    TwoFingerLongPress,
    ThreeFingerLongPress,
}

impl GestureEvent {
    pub fn kind(&self) -> GestureKind {
        match self {
            Self::SingleTap => GestureKind::SingleTap,
            Self::DoubleTap => GestureKind::DoubleTap,
            Self::TripleTap => GestureKind::TripleTap,
            Self::LongPress => GestureKind::LongPress,
            Self::Swipe(_) => GestureKind::Swipe,
            Self::DoubleSwipe(_) => GestureKind::DoubleSwipe,
            Self::TwoFingerSwipe { .. } => GestureKind::TwoFingerSwipe,
            Self::ThreeFingerSwipe { .. } => GestureKind::ThreeFingerSwipe,
            Self::TwoFingerTap => GestureKind::TwoFingerTap,
            Self::ThreeFingerTap => GestureKind::ThreeFingerTap,
            Self::TwoFingerLongPress => GestureKind::TwoFingerLongPress,
            Self::ThreeFingerLongPress => GestureKind::ThreeFingerLongPress,
        }
    }

    pub fn direction(&self) -> Option<SwipeDirection> {
        match self {
            Self::Swipe(outcome) => Some(outcome.direction),
            Self::DoubleSwipe(direction)
            | Self::TwoFingerSwipe { direction, .. }
            | Self::ThreeFingerSwipe { direction, .. } => Some(*direction),
            _ => None,
        }
    }

    /// Config lookup keys, most specific first: `swipe_right_to_left`, then `swipe`.
    pub fn action_keys(&self) -> Vec<String> {
        let kind: &str = self.kind().into();
        match self.direction() {
            Some(direction) => vec![format!("{kind}_{direction}"), kind.to_string()],
            None => vec![kind.to_string()],
        }
    }
}

impl std::fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Swipe(outcome) => write!(
                f,
                "swipe {} ({:.1}%, origin {:.1}%)",
                outcome.direction, outcome.magnitude_pct, outcome.origin_pct
            ),
            Self::TwoFingerSwipe {
                direction,
                origin_pct,
            }
            | Self::ThreeFingerSwipe {
                direction,
                origin_pct,
            } => write!(f, "{} {direction} (origin {origin_pct:.1}%)", self.kind()),
            Self::DoubleSwipe(direction) => write!(f, "double_swipe {direction}"),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

type Listeners<F> = Vec<Box<F>>;

/// Typed callback registry.  Listeners run synchronously, in registration
/// order, inside the tick that produced the event.
#[derive(Default)]
pub struct GestureEventSink {
    single_tap: Listeners<dyn FnMut()>,
    double_tap: Listeners<dyn FnMut()>,
    triple_tap: Listeners<dyn FnMut()>,
    long_press: Listeners<dyn FnMut()>,
    swipe: Listeners<dyn FnMut(SwipeDirection, f64, f64)>,
    swipe_in: Vec<(SwipeDirection, Box<dyn FnMut(f64)>)>,
    double_swipe: Listeners<dyn FnMut(SwipeDirection)>,
    two_finger_swipe: Listeners<dyn FnMut(SwipeDirection, f64)>,
    three_finger_swipe: Listeners<dyn FnMut(SwipeDirection, f64)>,
    two_finger_tap: Listeners<dyn FnMut()>,
    three_finger_tap: Listeners<dyn FnMut()>,
    two_finger_long_press: Listeners<dyn FnMut()>,
    three_finger_long_press: Listeners<dyn FnMut()>,
    any: Listeners<dyn FnMut(&GestureEvent)>,
}

impl std::fmt::Debug for GestureEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureEventSink")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl GestureEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_single_tap(&mut self, f: impl FnMut() + 'static) {
        self.single_tap.push(Box::new(f));
    }

    pub fn on_double_tap(&mut self, f: impl FnMut() + 'static) {
        self.double_tap.push(Box::new(f));
    }

    pub fn on_triple_tap(&mut self, f: impl FnMut() + 'static) {
        self.triple_tap.push(Box::new(f));
    }

    pub fn on_long_press(&mut self, f: impl FnMut() + 'static) {
        self.long_press.push(Box::new(f));
    }

    /// Called with `(direction, magnitude_pct, origin_pct)`.
    pub fn on_swipe(&mut self, f: impl FnMut(SwipeDirection, f64, f64) + 'static) {
        self.swipe.push(Box::new(f));
    }

    /// Regular swipes in one direction only, called with `magnitude_pct`.
    pub fn on_swipe_in(&mut self, direction: SwipeDirection, f: impl FnMut(f64) + 'static) {
        self.swipe_in.push((direction, Box::new(f)));
    }

    pub fn on_double_swipe(&mut self, f: impl FnMut(SwipeDirection) + 'static) {
        self.double_swipe.push(Box::new(f));
    }

    /// Called with `(direction, origin_pct)`.
    pub fn on_two_finger_swipe(&mut self, f: impl FnMut(SwipeDirection, f64) + 'static) {
        self.two_finger_swipe.push(Box::new(f));
    }

    /// Called with `(direction, origin_pct)`.
    pub fn on_three_finger_swipe(&mut self, f: impl FnMut(SwipeDirection, f64) + 'static) {
        self.three_finger_swipe.push(Box::new(f));
    }

    pub fn on_two_finger_tap(&mut self, f: impl FnMut() + 'static) {
        self.two_finger_tap.push(Box::new(f));
    }

    pub fn on_three_finger_tap(&mut self, f: impl FnMut() + 'static) {
        self.three_finger_tap.push(Box::new(f));
    }

    pub fn on_two_finger_long_press(&mut self, f: impl FnMut() + 'static) {
        self.two_finger_long_press.push(Box::new(f));
    }

    pub fn on_three_finger_long_press(&mut self, f: impl FnMut() + 'static) {
        self.three_finger_long_press.push(Box::new(f));
    }

    /// Every event, after the typed listeners for it have run.
    pub fn on_any(&mut self, f: impl FnMut(&GestureEvent) + 'static) {
        self.any.push(Box::new(f));
    }

    pub fn listener_count(&self) -> usize {
        self.single_tap.len()
            + self.double_tap.len()
            + self.triple_tap.len()
            + self.long_press.len()
            + self.swipe.len()
            + self.swipe_in.len()
            + self.double_swipe.len()
            + self.two_finger_swipe.len()
            + self.three_finger_swipe.len()
            + self.two_finger_tap.len()
            + self.three_finger_tap.len()
            + self.two_finger_long_press.len()
            + self.three_finger_long_press.len()
            + self.any.len()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Invoke every listener registered for `event`.
    pub fn publish(&mut self, event: &GestureEvent) {
        match *event {
            GestureEvent::SingleTap => call_all(&mut self.single_tap),
            GestureEvent::DoubleTap => call_all(&mut self.double_tap),
            GestureEvent::TripleTap => call_all(&mut self.triple_tap),
            GestureEvent::LongPress => call_all(&mut self.long_press),
            GestureEvent::Swipe(outcome) => {
                for f in &mut self.swipe {
                    f(outcome.direction, outcome.magnitude_pct, outcome.origin_pct);
                }
                for (direction, f) in &mut self.swipe_in {
                    if *direction == outcome.direction {
                        f(outcome.magnitude_pct);
                    }
                }
            }
            GestureEvent::DoubleSwipe(direction) => {
                for f in &mut self.double_swipe {
                    f(direction);
                }
            }
            GestureEvent::TwoFingerSwipe {
                direction,
                origin_pct,
            } => {
                for f in &mut self.two_finger_swipe {
                    f(direction, origin_pct);
                }
            }
            GestureEvent::ThreeFingerSwipe {
                direction,
                origin_pct,
            } => {
                for f in &mut self.three_finger_swipe {
                    f(direction, origin_pct);
                }
            }
            GestureEvent::TwoFingerTap => call_all(&mut self.two_finger_tap),
            GestureEvent::ThreeFingerTap => call_all(&mut self.three_finger_tap),
            GestureEvent::TwoFingerLongPress => call_all(&mut self.two_finger_long_press),
            GestureEvent::ThreeFingerLongPress => call_all(&mut self.three_finger_long_press),
        }
        for f in &mut self.any {
            f(event);
        }
    }
}

fn call_all(listeners: &mut Listeners<dyn FnMut()>) {
    for f in listeners {
        f();
    }
}
