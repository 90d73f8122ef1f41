//! Integration tests for the event-processing logic in `event`.
//!
//! Tests use `TouchEvent` directly (no hardware) and also verify
//! `classify_event` with synthetic `evdev::InputEvent`s.
use std::collections::HashMap;

use evdev::{AbsoluteAxisType, EventType, InputEvent, Synchronization};
use strum::IntoEnumIterator;

use swipestr::clock::ManualClock;
use swipestr::config::{EngineConfig, GestureConfig};
use swipestr::engine::GestureEngine;
use swipestr::event::{
    FrameAssembler, TouchEvent, classify_event, parse_usb_id, process_touch_events, resolve_action,
};
use swipestr::frame::{Point, PointerPhase, ScreenSize};
use swipestr::sink::GestureEvent;
use swipestr::swipe::{SwipeDirection, SwipeOutcome};

// -- Helpers --------------------------------------------------

fn make_assembler() -> FrameAssembler {
    FrameAssembler::new((0.0, 1000.0), (0.0, 1000.0))
}

fn make_engine(assembler: &FrameAssembler) -> (GestureEngine<ManualClock>, ManualClock) {
    let clock = ManualClock::new(0.0);
    let engine = GestureEngine::with_clock(EngineConfig::default(), assembler.screen(), clock.clone());
    (engine, clock)
}

fn make_gestures(entries: &[(&str, &str, bool)]) -> HashMap<String, GestureConfig> {
    entries
        .iter()
        .map(|(name, action, enabled)| {
            (
                name.to_string(),
                GestureConfig {
                    action: if action.is_empty() {
                        None
                    } else {
                        Some(action.to_string())
                    },
                    enabled: *enabled,
                },
            )
        })
        .collect()
}

/// Shorthand: feed TouchEvents at t = 0, return recognized gestures.
fn feed(events: &[TouchEvent]) -> Vec<GestureEvent> {
    let mut assembler = make_assembler();
    let (mut engine, _clock) = make_engine(&assembler);
    process_touch_events(&mut assembler, &mut engine, events)
}

/// One finger from `from` to `to`, in device coordinates (y grows downward).
fn drag(from: (f64, f64), to: (f64, f64)) -> Vec<TouchEvent> {
    vec![
        TouchEvent::TrackingId(0),
        TouchEvent::PositionX(from.0),
        TouchEvent::PositionY(from.1),
        TouchEvent::SynReport,
        TouchEvent::PositionX(to.0),
        TouchEvent::PositionY(to.1),
        TouchEvent::SynReport,
        TouchEvent::FingerUp,
        TouchEvent::SynReport,
    ]
}

fn direction_of(gestures: &[GestureEvent]) -> Option<SwipeDirection> {
    match gestures {
        [event] => event.direction(),
        _ => None,
    }
}

fn swipe(direction: SwipeDirection) -> GestureEvent {
    GestureEvent::Swipe(SwipeOutcome {
        direction,
        magnitude_pct: 50.0,
        origin_pct: 10.0,
    })
}

// -- process_touch_events: swipe recognition ------------------

#[test]
fn test_swipe_right_to_left() {
    let gestures = feed(&drag((800.0, 500.0), (100.0, 500.0)));
    let [GestureEvent::Swipe(outcome)] = gestures.as_slice() else {
        panic!("expected one swipe, got {gestures:?}");
    };
    assert_eq!(outcome.direction, SwipeDirection::RightToLeft);
    assert!((outcome.magnitude_pct - 70.0).abs() < 1e-9);
    assert!((outcome.origin_pct - 20.0).abs() < 1e-9);
}

#[test]
fn test_swipe_left_to_right() {
    let gestures = feed(&drag((100.0, 500.0), (800.0, 500.0)));
    assert_eq!(direction_of(&gestures), Some(SwipeDirection::LeftToRight));
}

#[test]
fn test_finger_moving_up_the_screen_is_down_to_up() {
    // Device y shrinks towards the top of the panel
    let gestures = feed(&drag((500.0, 800.0), (500.0, 100.0)));
    assert_eq!(direction_of(&gestures), Some(SwipeDirection::DownToUp));
}

#[test]
fn test_finger_moving_down_the_screen_is_up_to_down() {
    let gestures = feed(&drag((500.0, 100.0), (500.0, 800.0)));
    assert_eq!(direction_of(&gestures), Some(SwipeDirection::UpToDown));
}

#[test]
fn test_small_movement_no_gesture() {
    assert!(feed(&drag((500.0, 500.0), (520.0, 510.0))).is_empty());
}

#[test]
fn test_diagonal_tie_no_swipe() {
    assert!(feed(&drag((100.0, 100.0), (600.0, 600.0))).is_empty());
}

#[test]
fn test_empty_events_no_gesture() {
    assert!(feed(&[]).is_empty());
}

#[test]
fn test_syn_report_only_no_gesture() {
    assert!(feed(&[TouchEvent::SynReport, TouchEvent::SynReport]).is_empty());
}

#[test]
fn test_finger_up_without_touch_no_gesture() {
    assert!(feed(&[TouchEvent::FingerUp, TouchEvent::SynReport]).is_empty());
}

#[test]
fn test_two_swipes_in_sequence() {
    let mut assembler = make_assembler();
    let (mut engine, clock) = make_engine(&assembler);
    let first = process_touch_events(&mut assembler, &mut engine, &drag((800.0, 500.0), (100.0, 500.0)));
    clock.set(0.5);
    assert_eq!(engine.poll(), vec![GestureEvent::SingleTap]);
    clock.set(1.0);
    let second = process_touch_events(&mut assembler, &mut engine, &drag((100.0, 500.0), (800.0, 500.0)));
    assert_eq!(direction_of(&first), Some(SwipeDirection::RightToLeft));
    assert_eq!(direction_of(&second), Some(SwipeDirection::LeftToRight));
}

#[test]
fn test_quick_repeat_is_double_swipe() {
    let mut assembler = make_assembler();
    let (mut engine, clock) = make_engine(&assembler);
    process_touch_events(&mut assembler, &mut engine, &drag((800.0, 500.0), (100.0, 500.0)));
    clock.set(0.2);
    let second = process_touch_events(&mut assembler, &mut engine, &drag((800.0, 500.0), (100.0, 500.0)));
    assert_eq!(
        second,
        vec![GestureEvent::DoubleSwipe(SwipeDirection::RightToLeft)]
    );
}

#[test]
fn test_tap_through_assembler() {
    let mut assembler = make_assembler();
    let (mut engine, clock) = make_engine(&assembler);
    let events = drag((500.0, 500.0), (500.0, 500.0));
    assert!(process_touch_events(&mut assembler, &mut engine, &events).is_empty());
    clock.set(0.5);
    assert_eq!(engine.poll(), vec![GestureEvent::SingleTap]);
}

#[test]
fn test_two_finger_swipe_through_assembler() {
    let events = vec![
        TouchEvent::Slot(0),
        TouchEvent::TrackingId(10),
        TouchEvent::PositionX(100.0),
        TouchEvent::PositionY(500.0),
        TouchEvent::Slot(1),
        TouchEvent::TrackingId(11),
        TouchEvent::PositionX(120.0),
        TouchEvent::PositionY(600.0),
        TouchEvent::SynReport,
        TouchEvent::Slot(0),
        TouchEvent::PositionX(700.0),
        TouchEvent::Slot(1),
        TouchEvent::PositionX(720.0),
        TouchEvent::SynReport,
        TouchEvent::Slot(0),
        TouchEvent::FingerUp,
        TouchEvent::Slot(1),
        TouchEvent::FingerUp,
        TouchEvent::SynReport,
    ];
    assert_eq!(
        feed(&events),
        vec![GestureEvent::TwoFingerSwipe {
            direction: SwipeDirection::LeftToRight,
            origin_pct: 10.0
        }]
    );
}

// -- FrameAssembler -------------------------------------------

#[test]
fn test_assembler_screen_from_ranges() {
    let assembler = FrameAssembler::new((100.0, 1100.0), (0.0, 800.0));
    assert_eq!(assembler.screen(), ScreenSize::new(1000.0, 800.0));
}

#[test]
fn test_assembler_phases() {
    let mut assembler = make_assembler();
    let mut frames = Vec::new();
    for event in drag((200.0, 300.0), (400.0, 300.0)) {
        frames.extend(assembler.push(&event));
    }
    let phases: Vec<_> = frames.iter().map(|f| f.phase).collect();
    assert_eq!(
        phases,
        vec![PointerPhase::Began, PointerPhase::Moved, PointerPhase::Ended]
    );
    assert_eq!(frames[0].position, Point::new(200.0, 700.0));
    assert_eq!(frames[0].pointer_count, 1);
    // The release keeps the last known position
    assert_eq!(frames[2].position, Point::new(400.0, 700.0));
    assert_eq!(frames[2].pointer_count, 0);
    assert!(!assembler.is_down());
}

#[test]
fn test_assembler_offsets_by_axis_minimum() {
    let mut assembler = FrameAssembler::new((100.0, 1100.0), (50.0, 1050.0));
    assembler.push(&TouchEvent::TrackingId(1));
    assembler.push(&TouchEvent::PositionX(300.0));
    assembler.push(&TouchEvent::PositionY(250.0));
    let frame = assembler.push(&TouchEvent::SynReport).unwrap();
    assert_eq!(frame.position, Point::new(200.0, 800.0));
}

#[test]
fn test_assembler_counts_slots() {
    let mut assembler = make_assembler();
    for event in [
        TouchEvent::Slot(0),
        TouchEvent::TrackingId(1),
        TouchEvent::PositionX(100.0),
        TouchEvent::Slot(1),
        TouchEvent::TrackingId(2),
        TouchEvent::Slot(2),
        TouchEvent::TrackingId(3),
    ] {
        assert!(assembler.push(&event).is_none());
    }
    let frame = assembler.push(&TouchEvent::SynReport).unwrap();
    assert_eq!(frame.phase, PointerPhase::Began);
    assert_eq!(frame.pointer_count, 3);
    assert_eq!(assembler.active_contacts(), 3);

    assembler.push(&TouchEvent::Slot(2));
    assembler.push(&TouchEvent::FingerUp);
    let frame = assembler.push(&TouchEvent::SynReport).unwrap();
    assert_eq!(frame.phase, PointerPhase::Moved);
    assert_eq!(frame.pointer_count, 2);
}

#[test]
fn test_primary_position_frozen_when_first_contact_lifts() {
    let mut assembler = make_assembler();
    for event in [
        TouchEvent::Slot(0),
        TouchEvent::TrackingId(1),
        TouchEvent::PositionX(100.0),
        TouchEvent::PositionY(100.0),
        TouchEvent::Slot(1),
        TouchEvent::TrackingId(2),
        TouchEvent::PositionX(900.0),
        TouchEvent::PositionY(900.0),
        TouchEvent::SynReport,
        TouchEvent::Slot(0),
        TouchEvent::FingerUp,
        TouchEvent::SynReport,
        TouchEvent::Slot(1),
        TouchEvent::PositionX(500.0),
    ] {
        assembler.push(&event);
    }
    let frame = assembler.push(&TouchEvent::SynReport).unwrap();
    assert_eq!(frame.phase, PointerPhase::Moved);
    assert_eq!(frame.pointer_count, 1);
    assert_eq!(frame.position, Point::new(100.0, 900.0));
}

#[test]
fn test_hold_frame_only_while_down() {
    let mut assembler = make_assembler();
    assert!(assembler.hold_frame().is_none());
    assembler.push(&TouchEvent::TrackingId(1));
    assembler.push(&TouchEvent::PositionX(300.0));
    assembler.push(&TouchEvent::PositionY(400.0));
    assembler.push(&TouchEvent::SynReport);

    let held = assembler.hold_frame().unwrap();
    assert_eq!(held.phase, PointerPhase::Moved);
    assert_eq!(held.position, Point::new(300.0, 600.0));
    assert_eq!(held.pointer_count, 1);

    assembler.push(&TouchEvent::FingerUp);
    assembler.push(&TouchEvent::SynReport);
    assert!(assembler.hold_frame().is_none());
}

#[test]
fn test_hold_frame_drives_long_press() {
    let mut assembler = make_assembler();
    let (mut engine, clock) = make_engine(&assembler);
    let press = [
        TouchEvent::TrackingId(1),
        TouchEvent::PositionX(500.0),
        TouchEvent::PositionY(500.0),
        TouchEvent::SynReport,
    ];
    assert!(process_touch_events(&mut assembler, &mut engine, &press).is_empty());
    clock.set(1.0);
    let frame = assembler.hold_frame().unwrap();
    assert_eq!(
        engine.tick(frame),
        vec![GestureEvent::LongPress, GestureEvent::SingleTap]
    );
}

#[test]
fn test_reset_forgets_contacts() {
    let mut assembler = make_assembler();
    assembler.push(&TouchEvent::TrackingId(1));
    assembler.push(&TouchEvent::SynReport);
    assert!(assembler.is_down());
    assembler.reset();
    assert!(!assembler.is_down());
    assert_eq!(assembler.active_contacts(), 0);
    assert!(assembler.push(&TouchEvent::SynReport).is_none());
}

// -- classify_event: evdev → TouchEvent -----------------------

#[test]
fn test_classify_mt_slot() {
    let ev = InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_MT_SLOT.0, 2);
    assert_eq!(classify_event(&ev), Some(TouchEvent::Slot(2)));
}

#[test]
fn test_classify_mt_position_x() {
    let ev = InputEvent::new(
        EventType::ABSOLUTE,
        AbsoluteAxisType::ABS_MT_POSITION_X.0,
        42,
    );
    assert_eq!(classify_event(&ev), Some(TouchEvent::PositionX(42.0)));
}

#[test]
fn test_classify_mt_position_y() {
    let ev = InputEvent::new(
        EventType::ABSOLUTE,
        AbsoluteAxisType::ABS_MT_POSITION_Y.0,
        99,
    );
    assert_eq!(classify_event(&ev), Some(TouchEvent::PositionY(99.0)));
}

#[test]
fn test_classify_tracking_id() {
    let down = InputEvent::new(
        EventType::ABSOLUTE,
        AbsoluteAxisType::ABS_MT_TRACKING_ID.0,
        5,
    );
    let up = InputEvent::new(
        EventType::ABSOLUTE,
        AbsoluteAxisType::ABS_MT_TRACKING_ID.0,
        -1,
    );
    assert_eq!(classify_event(&down), Some(TouchEvent::TrackingId(5)));
    assert_eq!(classify_event(&up), Some(TouchEvent::FingerUp));
}

#[test]
fn test_classify_syn_report() {
    let ev = InputEvent::new(EventType::SYNCHRONIZATION, Synchronization::SYN_REPORT.0, 0);
    assert_eq!(classify_event(&ev), Some(TouchEvent::SynReport));
}

#[test]
fn test_classify_irrelevant_events() {
    // ABS_X (not multi-touch) should be ignored
    let abs = InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_X.0, 100);
    let key = InputEvent::new(EventType::KEY, 0x14a, 1); // BTN_TOUCH
    assert_eq!(classify_event(&abs), None);
    assert_eq!(classify_event(&key), None);
}

// -- resolve_action -------------------------------------------

#[test]
fn test_resolve_action_enabled() {
    let g = make_gestures(&[("double_tap", "echo double", true)]);
    assert_eq!(
        resolve_action(&GestureEvent::DoubleTap, &g),
        Some("echo double")
    );
}

#[test]
fn test_resolve_action_disabled() {
    let g = make_gestures(&[("double_tap", "echo double", false)]);
    assert_eq!(resolve_action(&GestureEvent::DoubleTap, &g), None);
}

#[test]
fn test_resolve_action_no_action_string() {
    let g = make_gestures(&[("long_press", "", true)]);
    assert_eq!(resolve_action(&GestureEvent::LongPress, &g), None);
}

#[test]
fn test_resolve_action_not_configured() {
    let g = make_gestures(&[("single_tap", "echo tap", true)]);
    assert_eq!(resolve_action(&GestureEvent::TripleTap, &g), None);
    assert_eq!(resolve_action(&GestureEvent::SingleTap, &HashMap::new()), None);
}

#[test]
fn test_resolve_action_direction_specific_first() {
    let g = make_gestures(&[
        ("swipe", "echo any", true),
        ("swipe_right_to_left", "echo back", true),
    ]);
    assert_eq!(
        resolve_action(&swipe(SwipeDirection::RightToLeft), &g),
        Some("echo back")
    );
    assert_eq!(
        resolve_action(&swipe(SwipeDirection::DownToUp), &g),
        Some("echo any")
    );
}

#[test]
fn test_resolve_action_disabled_specific_blocks_generic() {
    let g = make_gestures(&[
        ("swipe", "echo any", true),
        ("swipe_left_to_right", "echo fwd", false),
    ]);
    assert_eq!(resolve_action(&swipe(SwipeDirection::LeftToRight), &g), None);
}

#[test]
fn test_resolve_action_every_direction() {
    for direction in SwipeDirection::iter() {
        let key = format!("two_finger_swipe_{direction}");
        let g = make_gestures(&[(key.as_str(), "echo two", true)]);
        let event = GestureEvent::TwoFingerSwipe {
            direction,
            origin_pct: 0.0,
        };
        assert_eq!(resolve_action(&event, &g), Some("echo two"), "{key}");
        assert_eq!(
            resolve_action(&GestureEvent::DoubleSwipe(direction), &g),
            None
        );
    }
}

#[test]
fn test_resolve_action_multi_finger_kinds() {
    let g = make_gestures(&[
        ("two_finger_tap", "echo 2tap", true),
        ("three_finger_tap", "echo 3tap", true),
        ("two_finger_long_press", "echo 2lp", true),
        ("three_finger_long_press", "echo 3lp", true),
    ]);
    assert_eq!(resolve_action(&GestureEvent::TwoFingerTap, &g), Some("echo 2tap"));
    assert_eq!(resolve_action(&GestureEvent::ThreeFingerTap, &g), Some("echo 3tap"));
    assert_eq!(
        resolve_action(&GestureEvent::TwoFingerLongPress, &g),
        Some("echo 2lp")
    );
    assert_eq!(
        resolve_action(&GestureEvent::ThreeFingerLongPress, &g),
        Some("echo 3lp")
    );
}

// -- parse_usb_id ---------------------------------------------

#[test]
fn test_parse_usb_id_valid() {
    assert_eq!(parse_usb_id("1234:5678"), Some((0x1234, 0x5678)));
}

#[test]
fn test_parse_usb_id_uppercase() {
    assert_eq!(parse_usb_id("ABCD:EF01"), Some((0xabcd, 0xef01)));
}

#[test]
fn test_parse_usb_id_with_usb_prefix() {
    assert_eq!(parse_usb_id("USB:0eef:0001"), Some((0x0eef, 0x0001)));
}

#[test]
fn test_parse_usb_id_invalid() {
    assert_eq!(parse_usb_id("12345678"), None);
    assert_eq!(parse_usb_id("zzzz:5678"), None);
    assert_eq!(parse_usb_id(""), None);
}

// -- End-to-end: events → action ------------------------------

#[test]
fn test_end_to_end_swipe_fires_correct_action() {
    let g = make_gestures(&[
        ("swipe_right_to_left", "xdotool key ctrl+Tab", true),
        ("swipe_left_to_right", "xdotool key ctrl+shift+Tab", true),
    ]);
    let gestures = feed(&drag((800.0, 500.0), (100.0, 500.0)));
    let actions: Vec<_> = gestures.iter().filter_map(|e| resolve_action(e, &g)).collect();
    assert_eq!(actions, vec!["xdotool key ctrl+Tab"]);
}

#[test]
fn test_end_to_end_unconfigured_gesture_no_action() {
    let g = make_gestures(&[("single_tap", "echo tap", true)]);
    let gestures = feed(&drag((500.0, 800.0), (500.0, 100.0)));
    assert_eq!(gestures.len(), 1);
    assert_eq!(resolve_action(&gestures[0], &g), None);
}
