//! The gesture engine: one session, its classifiers, and the listener registry.
//!
//! An external driver calls [`GestureEngine::tick`] once per frame (or
//! [`GestureEngine::poll`] when there is no input).  Everything runs
//! synchronously inside that call; nothing here blocks or spawns.
use log::{debug, trace, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::config::EngineConfig;
use crate::frame::{PointerFrame, PointerPhase, ScreenSize};
use crate::long_press::{self, LongPressMonitor};
use crate::router::{FingerMode, MultiTouchRouter};
use crate::session::PointerSession;
use crate::sink::{GestureEvent, GestureEventSink};
use crate::swipe::{SwipeClassifier, SwipeDirection};
use crate::tap::{TapClassifier, TapKind};

pub struct GestureEngine<C: Clock = MonotonicClock> {
    config: EngineConfig,
    screen: ScreenSize,
    clock: C,
    session: PointerSession,
    swipe: SwipeClassifier,
    tap: TapClassifier,
    long_press: LongPressMonitor,
    router: MultiTouchRouter,
    sink: GestureEventSink,
}

impl GestureEngine<MonotonicClock> {
    pub fn new(config: EngineConfig, screen: ScreenSize) -> Self {
        Self::with_clock(config, screen, MonotonicClock::new())
    }
}

impl<C: Clock> GestureEngine<C> {
    /// `config` is expected to have passed [`EngineConfig::validate`]; a
    /// non-finite window would schedule timers that never come due.
    pub fn with_clock(config: EngineConfig, screen: ScreenSize, clock: C) -> Self {
        debug_assert!(
            config.validate("engine").is_ok(),
            "invalid engine config: {config:?}"
        );
        Self {
            swipe: SwipeClassifier::new(&config),
            tap: TapClassifier::new(config.tap_window),
            long_press: LongPressMonitor::new(config.long_press_duration),
            router: MultiTouchRouter::new(),
            session: PointerSession::new(),
            sink: GestureEventSink::new(),
            config,
            screen,
            clock,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session(&self) -> &PointerSession {
        &self.session
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    /// Reference dimensions for all later percentage computations.
    pub fn set_screen(&mut self, screen: ScreenSize) {
        self.screen = screen;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &GestureEventSink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut GestureEventSink {
        &mut self.sink
    }

    /// Process one frame.  Returns the emitted events in publication order
    /// (long-press, swipes, taps); listeners have already run when this returns.
    pub fn tick(&mut self, frame: PointerFrame) -> Vec<GestureEvent> {
        let now = self.clock.now();
        let mut emitted = Vec::new();

        // Resolutions that were already overdue before this frame arrived.
        let expired = self.tap.pop_expired(&self.session, now);
        self.resolve_taps(expired, &mut emitted);

        if frame.is_valid() {
            self.apply(frame, now, &mut emitted);
        } else {
            warn!("Ignoring frame with non-finite position {:?}", frame.position);
        }

        let due = self.tap.pop_due(&self.session, now);
        self.resolve_taps(due, &mut emitted);

        self.publish(emitted)
    }

    /// Run due tap resolutions without new input.
    pub fn poll(&mut self) -> Vec<GestureEvent> {
        let now = self.clock.now();
        let mut emitted = Vec::new();
        let due = self.tap.pop_due(&self.session, now);
        self.resolve_taps(due, &mut emitted);
        self.publish(emitted)
    }

    fn apply(&mut self, frame: PointerFrame, now: f64, emitted: &mut Vec<GestureEvent>) {
        match frame.phase {
            PointerPhase::Began => {
                self.session.begin(frame.position, now, frame.pointer_count);
                if let Some(kind) = self.tap.on_contact_down(&mut self.session, now) {
                    emitted.extend(self.router.tap(self.span_mode(), kind));
                }
            }
            PointerPhase::Moved => {
                if !self.session.held {
                    trace!("Ignoring move without an active contact");
                    return;
                }
                self.session.update(frame.position, frame.pointer_count);
                let mode = FingerMode::from_count(frame.pointer_count);

                if self.long_press.check(&mut self.session, now) {
                    emitted.push(self.router.long_press(mode));
                }
                if !self.config.resolve_swipe_on_release {
                    self.resolve_swipe(mode, now, emitted);
                }
            }
            PointerPhase::Ended => {
                if !self.session.held {
                    trace!("Ignoring release without an active contact");
                    return;
                }
                self.session.update(frame.position, frame.pointer_count);
                let mode = self.span_mode();

                // On-move resolution still gets the release position.
                self.resolve_swipe(mode, now, emitted);
                self.session.end(now);

                if mode.is_multi()
                    && self.session.tap_count == 1
                    && !self.session.consumed
                    && !self.session.long_press_fired
                {
                    emitted.extend(self.router.multi_finger_tap(mode));
                }
            }
        }
    }

    fn resolve_swipe(&mut self, mode: FingerMode, now: f64, emitted: &mut Vec<GestureEvent>) {
        if mode.is_multi() {
            if let Some(outcome) = self.swipe.resolve_multi_finger(&mut self.session, self.screen) {
                emitted.extend(self.router.multi_finger_swipe(mode, outcome));
            }
        } else if let Some(resolution) = self.swipe.resolve(&mut self.session, now, self.screen) {
            emitted.push(self.router.swipe(resolution));
        }
    }

    /// Confirmed tap resolutions fire as soon as they come due, whether or
    /// not a contact is down.  Only multi-finger spans drop them.
    fn resolve_taps(&self, kinds: Vec<TapKind>, emitted: &mut Vec<GestureEvent>) {
        let mode = self.span_mode();
        for kind in kinds {
            emitted.extend(self.router.tap(mode, kind));
        }
    }

    /// Finger mode of the span as a whole.
    fn span_mode(&self) -> FingerMode {
        FingerMode::from_count(self.session.peak_pointer_count)
    }

    fn publish(&mut self, mut emitted: Vec<GestureEvent>) -> Vec<GestureEvent> {
        emitted.sort_by_key(|event| event.kind().emission_rank());
        for event in &emitted {
            debug!("Gesture: {event}");
            self.sink.publish(event);
        }
        emitted
    }

    // -- Point-in-time queries ------------------------------------

    pub fn is_single_tap(&self) -> bool {
        self.session.tap_count == 1
    }

    pub fn is_double_tap(&self) -> bool {
        self.session.tap_count == 2
    }

    /// The long-press event fired for the current or most recent contact.
    pub fn is_long_pressed(&self) -> bool {
        self.session.long_press_fired
    }

    /// The current contact has been held for `duration` seconds, or the most
    /// recent one lasted that long.
    pub fn is_long_pressed_for(&self, duration: f64) -> bool {
        long_press::is_long_pressed(&self.session, self.clock.now(), duration)
    }

    /// The last regular swipe went in `direction` and is still inside the
    /// double-swipe window.
    pub fn is_recent_swipe(&self, direction: SwipeDirection) -> bool {
        self.swipe
            .is_double_swipe(self.session.last_swipe, direction, self.clock.now())
    }

    /// Direction the tracked delta classifies as, if the last frame routes
    /// to the same multi-finger mode as `fingers` (more than three counts as three).
    pub fn multi_finger_swipe(&self, fingers: u32) -> Option<SwipeDirection> {
        let mode = FingerMode::from_count(fingers);
        if !mode.is_multi() || FingerMode::from_count(self.session.pointer_count) != mode {
            return None;
        }
        self.swipe
            .classify(
                self.session.start_position,
                self.session.current_position,
                self.screen,
            )
            .map(|outcome| outcome.direction)
    }

    /// Whether a tap resolution is still waiting on its window.
    pub fn has_pending_tap(&self) -> bool {
        self.tap.has_pending()
    }
}
