//! Multi-device gesture manager and device discovery (I/O layer).
//!
//! Pure event-processing logic lives in [`crate::event`], classification in
//! [`crate::engine`].  Each configured device gets a dispatch thread that
//! owns its engine and a reader thread that blocks on the device.
use std::process::{Command, ExitCode};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use evdev::{AbsoluteAxisType, Device};
use log::{debug, error, info, warn};

use crate::config::{AppConfig, DeviceConfig, SwipestrError, parse_config_file};
use crate::engine::GestureEngine;
use crate::event::{
    FrameAssembler, TouchEvent, classify_event, parse_usb_id, process_touch_events, resolve_action,
};
use crate::sink::GestureEvent;

/// How often the dispatch loop wakes up without input to resolve pending
/// taps and detect long-presses on a still finger.
const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Messages from a reader thread to its dispatch loop.
enum DeviceMessage {
    Events(Vec<TouchEvent>),
    Reconnected,
}

// -- GestureManager (top-level orchestrator) ------------------

/// Manages gesture recognition across multiple touch devices.
pub struct GestureManager {
    config: AppConfig,
    running: Arc<AtomicBool>,
}

impl GestureManager {
    pub fn new(config_path: impl AsRef<std::path::Path>) -> Result<Self, SwipestrError> {
        Ok(Self {
            config: parse_config_file(config_path.as_ref())?,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start listening to all configured devices.  Blocks until every
    /// device loop has ended.
    pub fn start(&mut self) {
        if self.config.devices.is_empty() {
            error!("No devices configured");
            return;
        }

        self.running.store(true, Ordering::Relaxed);
        info!("Starting gesture manager");

        let mut handles = Vec::new();

        for (device_id, device_config) in &self.config.devices {
            let Some(device) = find_device(device_id, device_config) else {
                warn!("Device not found: {device_id}");
                continue;
            };
            let device_id = device_id.clone();
            let config = device_config.clone();
            let running = Arc::clone(&self.running);

            match thread::Builder::new()
                .name(format!("gesture-{device_id}"))
                .spawn(move || run_device_loop(&device_id, device, &config, &running))
            {
                Ok(handle) => handles.push(handle),
                Err(e) => error!("Failed to spawn device thread: {e}"),
            }
        }

        if handles.is_empty() {
            error!("No devices found, exiting");
            return;
        }

        for handle in handles {
            let _ = handle.join();
        }
    }

    /// Stop listening to devices.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        info!("Gesture manager stopped");
    }

    /// Get a reference to the running flag for signal handling.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Get the log level from the parsed configuration.
    pub fn config_log_level(&self) -> &str {
        &self.config.log_level
    }

    /// Get the optional log file path from the parsed configuration.
    pub fn config_log_file(&self) -> Option<&str> {
        self.config.log_file.as_deref()
    }
}

// -- Device I/O -----------------------------------------------

/// Check if a device has multi-touch capabilities.
fn is_touch_device(device: &Device) -> bool {
    let Some(abs_axes) = device.supported_absolute_axes() else {
        return false;
    };
    abs_axes.contains(AbsoluteAxisType::ABS_MT_POSITION_X)
        && abs_axes.contains(AbsoluteAxisType::ABS_MT_POSITION_Y)
}

/// Find a touchscreen device by USB vendor:product ID.
fn find_device(device_id: &str, config: &DeviceConfig) -> Option<Device> {
    let Some((vendor, product)) = parse_usb_id(&config.device_usb_id) else {
        warn!(
            "Device {device_id}: invalid USB ID format '{}' (expected vendor:product)",
            config.device_usb_id
        );
        return None;
    };

    let found = evdev::enumerate().find(|(_, device)| {
        let id = device.input_id();
        is_touch_device(device) && id.vendor() == vendor && id.product() == product
    });
    match found {
        Some((path, device)) => {
            info!(
                "Device {device_id}: using {} ({}) for USB ID {}",
                device.name().unwrap_or("unknown"),
                path.display(),
                config.device_usb_id
            );
            Some(device)
        }
        None => {
            warn!(
                "Device {device_id}: no touch device with USB ID {} found",
                config.device_usb_id
            );
            None
        }
    }
}

/// `(min, max)` of the device's multi-touch X and Y position axes.
fn axis_ranges(device: &Device) -> Option<((f64, f64), (f64, f64))> {
    let abs = device.get_abs_state().ok()?;
    let x = &abs[AbsoluteAxisType::ABS_MT_POSITION_X.0 as usize];
    let y = &abs[AbsoluteAxisType::ABS_MT_POSITION_Y.0 as usize];
    Some((
        (f64::from(x.minimum), f64::from(x.maximum)),
        (f64::from(y.minimum), f64::from(y.maximum)),
    ))
}

/// Build the assembler and engine from the device's axis ranges, start the
/// reader thread, and run the dispatch loop on the current thread.
fn run_device_loop(device_id: &str, device: Device, config: &DeviceConfig, running: &Arc<AtomicBool>) {
    let Some((x_range, y_range)) = axis_ranges(&device) else {
        error!("Device {device_id}: failed to read multi-touch axis ranges");
        return;
    };

    let mut assembler = FrameAssembler::new(x_range, y_range);
    let mut engine = GestureEngine::new(config.engine, assembler.screen());
    info!(
        "Started processing device: {device_id} (USB {})",
        config.device_usb_id
    );
    debug!(
        "  X range: {:?}, Y range: {:?}, engine: {:?}",
        x_range, y_range, config.engine
    );

    let (tx, rx) = mpsc::channel();
    let reader = {
        let device_id = device_id.to_string();
        let config = config.clone();
        let running = Arc::clone(running);
        thread::Builder::new()
            .name(format!("reader-{device_id}"))
            .spawn(move || read_loop(&device_id, device, &config, &running, &tx))
    };
    let reader = match reader {
        Ok(handle) => handle,
        Err(e) => {
            error!("Device {device_id}: failed to spawn reader thread: {e}");
            return;
        }
    };

    dispatch_loop(device_id, &rx, &mut assembler, &mut engine, config, running);
    let _ = reader.join();
}

/// Single owner of the engine: applies touch events as they arrive and
/// ticks on a fixed interval while idle.
fn dispatch_loop(
    device_id: &str,
    rx: &Receiver<DeviceMessage>,
    assembler: &mut FrameAssembler,
    engine: &mut GestureEngine,
    config: &DeviceConfig,
    running: &Arc<AtomicBool>,
) {
    while running.load(Ordering::Relaxed) {
        let fired = match rx.recv_timeout(TICK_INTERVAL) {
            Ok(DeviceMessage::Events(events)) => process_touch_events(assembler, engine, &events),
            Ok(DeviceMessage::Reconnected) => {
                assembler.reset();
                Vec::new()
            }
            Err(RecvTimeoutError::Timeout) => match assembler.hold_frame() {
                Some(frame) => engine.tick(frame),
                None => engine.poll(),
            },
            Err(RecvTimeoutError::Disconnected) => break,
        };
        for gesture in &fired {
            execute_gesture(device_id, gesture, config);
        }
    }
    debug!("Dispatch loop for {device_id} finished");
}

/// Blocking read loop - forwards classified events to the dispatch loop.
fn read_loop(
    device_id: &str,
    mut device: Device,
    config: &DeviceConfig,
    running: &Arc<AtomicBool>,
    tx: &Sender<DeviceMessage>,
) {
    while running.load(Ordering::Relaxed) {
        let fetched = device
            .fetch_events()
            .map(|iter| iter.filter_map(|e| classify_event(&e)).collect::<Vec<_>>());
        match fetched {
            Ok(events) => {
                if !events.is_empty() && tx.send(DeviceMessage::Events(events)).is_err() {
                    return;
                }
            }
            Err(e) => {
                if !running.load(Ordering::Relaxed) {
                    return;
                }
                warn!("Device {device_id} disconnected: {e}");
                match attempt_reconnect(device_id, config, running) {
                    Some(new_device) => {
                        device = new_device;
                        if tx.send(DeviceMessage::Reconnected).is_err() {
                            return;
                        }
                    }
                    None => return,
                }
            }
        }
    }
}

/// Spawn the shell command for a recognized gesture.
fn execute_gesture(device_id: &str, gesture: &GestureEvent, config: &DeviceConfig) {
    if let Some(action) = resolve_action(gesture, &config.gestures) {
        match Command::new("sh").arg("-c").arg(action).spawn() {
            Ok(_) => debug!("Spawned action: {action}"),
            Err(e) => error!("Failed to execute action '{action}': {e}"),
        }
        info!("{device_id}: {gesture}");
    }
}

/// Attempt to find the device again after it disconnects.
fn attempt_reconnect(
    device_id: &str,
    config: &DeviceConfig,
    running: &Arc<AtomicBool>,
) -> Option<Device> {
    const MAX_RETRIES: usize = 10;
    const RETRY_INTERVAL: Duration = Duration::from_secs(5);

    for attempt in 1..=MAX_RETRIES {
        if !running.load(Ordering::Relaxed) {
            return None;
        }
        info!("Reconnect attempt {attempt}/{MAX_RETRIES} for {device_id}...");
        thread::sleep(RETRY_INTERVAL);

        if let Some(new_device) = find_device(device_id, config) {
            info!("Reconnected to {device_id}");
            return Some(new_device);
        }
    }
    error!("Failed to reconnect to {device_id} after {MAX_RETRIES} attempts");
    None
}

/// Print every multi-touch capable device with its USB ID and panel size.
pub fn list_touch_devices() -> ExitCode {
    let devices: Vec<_> = evdev::enumerate()
        .filter(|(_, device)| is_touch_device(device))
        .collect();

    if devices.is_empty() {
        println!(
            "No multi-touch devices found.\n\n\
             Troubleshooting:\n\
             \x20 - Check that the touchscreen is connected\n\
             \x20 - Run 'libinput list-devices' to see all input devices\n\
             \x20 - Run as root if devices are not visible"
        );
        return ExitCode::FAILURE;
    }

    println!("\n=== swipestr: touchscreen devices ===\n");
    for (index, (path, device)) in devices.iter().enumerate() {
        let size = axis_ranges(device)
            .map(|(x, y)| format!("{} x {}", x.1 - x.0, y.1 - y.0))
            .unwrap_or_else(|| "unknown".to_string());
        println!(
            "[{}] {}\n\
             \x20 Path:    {}\n\
             \x20 USB ID:  {:04x}:{:04x}\n\
             \x20 Size:    {size}\n",
            index + 1,
            device.name().unwrap_or("unknown"),
            path.display(),
            device.input_id().vendor(),
            device.input_id().product(),
        );
    }

    println!(
        "Add a device to your gestures.toml:\n\
         \x20 [device.<name>]\n\
         \x20 device_usb_id = \"<USB ID>\"\n\
         \x20 enabled = true"
    );
    ExitCode::SUCCESS
}
