//! Touch event classification and frame assembly - no I/O, no hardware, fully testable.
//!
//! This module turns raw multi-touch events into the [`PointerFrame`]s the
//! engine consumes, and holds the small helpers the device layer needs:
//! USB-ID parsing and action resolution.  Everything here is a plain
//! function or a plain state machine with no side-effects.

use std::collections::{BTreeMap, HashMap};

use crate::clock::Clock;
use crate::config::GestureConfig;
use crate::engine::GestureEngine;
use crate::frame::{Point, PointerFrame, PointerPhase, ScreenSize};
use crate::sink::GestureEvent;

// -- TouchEvent -----------------------------------------------

/// Intermediate representation of a relevant touch event,
/// decoupled from `evdev` types for testability.
#[derive(Debug, Clone, PartialEq)]
pub enum TouchEvent {
    Slot(i32),
    PositionX(f64),
    PositionY(f64),
    TrackingId(i32),
    FingerUp,
    SynReport,
}

// -- FrameAssembler -------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct SlotState {
    x: f64,
    y: f64,
    active: bool,
}

/// Collects multi-touch (protocol B) slot updates and emits one
/// [`PointerFrame`] per `SYN_REPORT`.
///
/// The reported position is the first contact's.  If that contact lifts
/// while others stay down, its last position is kept until all lift.
/// Coordinates are shifted to start at zero and the vertical axis is
/// flipped so that up is positive.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    x_range: (f64, f64),
    y_range: (f64, f64),
    slots: BTreeMap<i32, SlotState>,
    current_slot: i32,
    primary_slot: Option<i32>,
    primary_position: Point,
    down: bool,
}

impl FrameAssembler {
    pub fn new(x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            x_range,
            y_range,
            slots: BTreeMap::new(),
            current_slot: 0,
            primary_slot: None,
            primary_position: Point::default(),
            down: false,
        }
    }

    /// Screen size implied by the axis ranges.
    pub fn screen(&self) -> ScreenSize {
        ScreenSize::new(
            self.x_range.1 - self.x_range.0,
            self.y_range.1 - self.y_range.0,
        )
    }

    /// Number of contacts currently down.
    pub fn active_contacts(&self) -> u32 {
        self.slots.values().filter(|s| s.active).count() as u32
    }

    pub fn is_down(&self) -> bool {
        self.down
    }

    /// Feed one event.  Returns a frame on `SYN_REPORT` when a contact
    /// began, moved or ended.
    pub fn push(&mut self, event: &TouchEvent) -> Option<PointerFrame> {
        match event {
            TouchEvent::Slot(slot) => self.current_slot = *slot,
            TouchEvent::TrackingId(_) => self.slots.entry(self.current_slot).or_default().active = true,
            TouchEvent::FingerUp => {
                if let Some(slot) = self.slots.get_mut(&self.current_slot) {
                    slot.active = false;
                }
            }
            TouchEvent::PositionX(x) => self.slots.entry(self.current_slot).or_default().x = *x,
            TouchEvent::PositionY(y) => self.slots.entry(self.current_slot).or_default().y = *y,
            TouchEvent::SynReport => return self.flush(),
        }
        None
    }

    /// Re-issue a `Moved` frame for a contact that is down but not moving.
    pub fn hold_frame(&self) -> Option<PointerFrame> {
        self.down.then(|| {
            PointerFrame::new(
                self.primary_position,
                PointerPhase::Moved,
                self.active_contacts(),
            )
        })
    }

    /// Forget all contacts, e.g. after the device was reconnected.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.current_slot = 0;
        self.primary_slot = None;
        self.down = false;
    }

    fn flush(&mut self) -> Option<PointerFrame> {
        let count = self.active_contacts();

        if count > 0 && self.primary_slot.is_none() {
            self.primary_slot = self
                .slots
                .iter()
                .find(|(_, s)| s.active)
                .map(|(slot, _)| *slot);
        }
        if let Some(state) = self.primary_slot.and_then(|slot| self.slots.get(&slot)) {
            if state.active {
                self.primary_position = self.normalize(state.x, state.y);
            }
        }

        let phase = match (self.down, count > 0) {
            (false, true) => PointerPhase::Began,
            (true, true) => PointerPhase::Moved,
            (true, false) => PointerPhase::Ended,
            (false, false) => return None,
        };
        self.down = count > 0;
        if !self.down {
            self.primary_slot = None;
        }
        Some(PointerFrame::new(self.primary_position, phase, count))
    }

    fn normalize(&self, x: f64, y: f64) -> Point {
        Point::new(x - self.x_range.0, self.y_range.1 - y)
    }
}

// -- Core processing ------------------------------------------

/// Feed a sequence of [`TouchEvent`]s through the assembler into the engine
/// and collect every gesture that fires.
pub fn process_touch_events<C: Clock>(
    assembler: &mut FrameAssembler,
    engine: &mut GestureEngine<C>,
    events: &[TouchEvent],
) -> Vec<GestureEvent> {
    let mut gestures = Vec::new();
    for event in events {
        if let Some(frame) = assembler.push(event) {
            gestures.extend(engine.tick(frame));
        }
    }
    gestures
}

// -- Helpers --------------------------------------------------

/// Parse a USB vendor:product ID string into `(vendor, product)`.
///
/// Accepts formats like `"1234:5678"` or `"USB:1234:5678"` (case-insensitive).
/// Returns `None` if the format is invalid or the hex values cannot be parsed.
pub fn parse_usb_id(raw: &str) -> Option<(u16, u16)> {
    let cleaned = raw.to_lowercase().replace("usb:", "");
    let (vendor_str, product_str) = cleaned.split_once(':')?;
    let vendor = u16::from_str_radix(vendor_str, 16).ok()?;
    let product = u16::from_str_radix(product_str, 16).ok()?;
    Some((vendor, product))
}

/// Look up the action string for a recognized gesture in the device config.
///
/// The most specific configured key decides (`swipe_right_to_left` before
/// `swipe`).  Returns `Some(action)` if that entry is enabled and has an action.
pub fn resolve_action<'a>(
    gesture: &GestureEvent,
    gestures: &'a HashMap<String, GestureConfig>,
) -> Option<&'a str> {
    gesture
        .action_keys()
        .iter()
        .find_map(|key| gestures.get(key))
        .filter(|gc| gc.enabled)
        .and_then(|gc| gc.action.as_deref())
}

/// Classify a single `evdev::InputEvent` into one of the touch-relevant
/// categories the assembler cares about.  Returns `None` for irrelevant events.
pub fn classify_event(event: &evdev::InputEvent) -> Option<TouchEvent> {
    use evdev::{AbsoluteAxisType, InputEventKind};

    match event.kind() {
        InputEventKind::AbsAxis(axis) => match axis {
            AbsoluteAxisType::ABS_MT_SLOT => Some(TouchEvent::Slot(event.value())),
            AbsoluteAxisType::ABS_MT_POSITION_X => {
                Some(TouchEvent::PositionX(event.value() as f64))
            }
            AbsoluteAxisType::ABS_MT_POSITION_Y => {
                Some(TouchEvent::PositionY(event.value() as f64))
            }
            AbsoluteAxisType::ABS_MT_TRACKING_ID => {
                if event.value() == -1 {
                    Some(TouchEvent::FingerUp)
                } else {
                    Some(TouchEvent::TrackingId(event.value()))
                }
            }
            _ => None,
        },
        InputEventKind::Synchronization(evdev::Synchronization::SYN_REPORT) => {
            Some(TouchEvent::SynReport)
        }
        _ => None,
    }
}
