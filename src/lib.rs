//! swipestr – tap, swipe and long-press classification for pointer input.
//!
//! [`engine::GestureEngine`] turns a stream of [`frame::PointerFrame`]s into
//! gesture events.  [`manager`] and [`event`] feed it from Linux
//! touchscreens and run configured shell actions.

pub mod clock;
pub mod config;
pub mod engine;
pub mod event;
pub mod frame;
pub mod long_press;
pub mod manager;
pub mod router;
pub mod session;
pub mod sink;
pub mod swipe;
pub mod tap;
pub mod timer;
