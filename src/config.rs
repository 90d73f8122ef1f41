//! Engine settings, configuration data structures and TOML parsing.
//!
//! The config file uses TOML format. Example:
//!
//! ```toml
//! [global]
//! log_level = "info"
//!
//! [global.thresholds]
//! horizontal_swipe_range_pct = 10.0
//! vertical_swipe_range_pct = 10.0
//! horizontal_edge_threshold_pct = 10.0
//! vertical_edge_threshold_pct = 10.0
//! double_swipe_window = 0.3
//! long_press_duration = 0.7
//! tap_window = 0.23
//! resolve_swipe_on_release = true
//! edge_origin_gating = false
//!
//! [global.gestures.single_tap]
//! action = "xdotool click 1"
//! enabled = true
//!
//! [device.kiosk]
//! device_usb_id = "1234:5678"
//! enabled = true
//!
//! [device.kiosk.gestures.swipe_right_to_left]
//! action = "xdotool key ctrl+Tab"
//! enabled = true
//!
//! [device.kiosk.thresholds]
//! edge_origin_gating = true
//! ```
//!
//! Every threshold is optional: a device value wins over the global one,
//! which wins over the built-in default.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

/// Top-level error type used throughout the crate.
#[derive(Debug, Error)]
pub enum SwipestrError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    #[error("Invalid setting '{setting}' for device '{device}': {message}")]
    InvalidSetting {
        device: String,
        setting: &'static str,
        message: String,
    },
}

/// Classification settings for one engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Minimum horizontal movement, in percent of screen width.
    pub horizontal_swipe_range_pct: f64,
    /// Minimum vertical movement, in percent of screen height.
    pub vertical_swipe_range_pct: f64,
    pub horizontal_edge_threshold_pct: f64,
    pub vertical_edge_threshold_pct: f64,
    /// Seconds within which a same-direction swipe counts as a double swipe.
    pub double_swipe_window: f64,
    pub long_press_duration: f64,
    /// Maximum gap, in seconds, between contact-downs of one tap streak.
    pub tap_window: f64,
    /// Resolve swipes when the contact lifts instead of while it moves.
    pub resolve_swipe_on_release: bool,
    /// Only accept swipes that start near the edge they move away from.
    pub edge_origin_gating: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizontal_swipe_range_pct: 10.0,
            vertical_swipe_range_pct: 10.0,
            horizontal_edge_threshold_pct: 10.0,
            vertical_edge_threshold_pct: 10.0,
            double_swipe_window: 0.3,
            long_press_duration: 0.7,
            tap_window: 0.23,
            resolve_swipe_on_release: true,
            edge_origin_gating: false,
        }
    }
}

impl EngineConfig {
    /// Check ranges.  `device` only labels the error.
    pub fn validate(&self, device: &str) -> Result<(), SwipestrError> {
        let percentages = [
            ("horizontal_swipe_range_pct", self.horizontal_swipe_range_pct),
            ("vertical_swipe_range_pct", self.vertical_swipe_range_pct),
            ("horizontal_edge_threshold_pct", self.horizontal_edge_threshold_pct),
            ("vertical_edge_threshold_pct", self.vertical_edge_threshold_pct),
        ];
        for (setting, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(invalid(device, setting, format!("{value} is not within 0..=100")));
            }
        }

        let durations = [
            ("double_swipe_window", self.double_swipe_window),
            ("long_press_duration", self.long_press_duration),
            ("tap_window", self.tap_window),
        ];
        for (setting, value) in durations {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(device, setting, format!("{value} must be a positive number of seconds")));
            }
        }
        Ok(())
    }
}

fn invalid(device: &str, setting: &'static str, message: String) -> SwipestrError {
    SwipestrError::InvalidSetting {
        device: device.to_string(),
        setting,
        message,
    }
}

/// Root of the TOML config file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    global: RawGlobal,
    #[serde(default)]
    device: HashMap<String, RawDevice>,
}

/// The `[global]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawGlobal {
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default)]
    thresholds: RawThresholds,
    #[serde(default)]
    gestures: HashMap<String, RawGestureConfig>,
}

/// Threshold values - all optional so sections can partially override.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
struct RawThresholds {
    horizontal_swipe_range_pct: Option<f64>,
    vertical_swipe_range_pct: Option<f64>,
    horizontal_edge_threshold_pct: Option<f64>,
    vertical_edge_threshold_pct: Option<f64>,
    double_swipe_window: Option<f64>,
    long_press_duration: Option<f64>,
    tap_window: Option<f64>,
    resolve_swipe_on_release: Option<bool>,
    edge_origin_gating: Option<bool>,
}

/// A gesture entry (action + enabled).
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
struct RawGestureConfig {
    action: Option<String>,
    enabled: Option<bool>,
}

/// A `[device.<id>]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawDevice {
    device_usb_id: Option<String>,
    enabled: Option<bool>,
    #[serde(default)]
    thresholds: RawThresholds,
    #[serde(default)]
    gestures: HashMap<String, RawGestureConfig>,
}

/// Gesture configuration (action + enabled).
#[derive(Debug, Clone)]
pub struct GestureConfig {
    pub action: Option<String>,
    pub enabled: bool,
}

/// Configuration for a single touch device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub device_usb_id: String,
    pub gestures: HashMap<String, GestureConfig>,
    pub engine: EngineConfig,
}

/// Top-level parsed configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: Option<String>,
    pub devices: HashMap<String, DeviceConfig>,
}

/// Generate fallback merging and default filling for threshold fields.
macro_rules! threshold_fields {
    ($($field:ident),+ $(,)?) => {
        impl RawThresholds {
            fn merge_with_fallback(&self, fallback: &RawThresholds) -> RawThresholds {
                RawThresholds {
                    $($field: self.$field.or(fallback.$field),)+
                }
            }

            fn into_engine_config(self) -> EngineConfig {
                let defaults = EngineConfig::default();
                EngineConfig {
                    $($field: self.$field.unwrap_or(defaults.$field),)+
                }
            }
        }
    };
}

threshold_fields!(
    horizontal_swipe_range_pct,
    vertical_swipe_range_pct,
    horizontal_edge_threshold_pct,
    vertical_edge_threshold_pct,
    double_swipe_window,
    long_press_duration,
    tap_window,
    resolve_swipe_on_release,
    edge_origin_gating,
);

/// Merge gesture maps: global first, then device-specific overrides.
fn merge_gestures(
    global: &HashMap<String, RawGestureConfig>,
    device: &HashMap<String, RawGestureConfig>,
) -> HashMap<String, GestureConfig> {
    let mut merged = HashMap::new();

    // Insert all global + device gesture names, device values override.
    for (name, gc) in global.iter().chain(device.iter()) {
        let entry = merged.entry(name.clone()).or_insert(GestureConfig {
            action: None,
            enabled: false,
        });
        if gc.action.is_some() {
            entry.action.clone_from(&gc.action);
        }
        if let Some(enabled) = gc.enabled {
            entry.enabled = enabled;
        }
    }

    merged
}

/// Parse a TOML config file and return the fully resolved `AppConfig`.
pub fn parse_config_file(path: &Path) -> Result<AppConfig, SwipestrError> {
    let text = fs::read_to_string(path).map_err(|e| SwipestrError::ConfigReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config_str(&text).map_err(|e| match e {
        SwipestrError::ConfigParseError { message, .. } => SwipestrError::ConfigParseError {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Parse config text.  Parse errors carry an empty path.
pub fn parse_config_str(text: &str) -> Result<AppConfig, SwipestrError> {
    let raw: RawConfig = toml::from_str(text).map_err(|e| SwipestrError::ConfigParseError {
        path: PathBuf::new(),
        message: e.to_string(),
    })?;

    let mut devices = HashMap::new();

    for (device_id, raw_dev) in &raw.device {
        if !raw_dev.enabled.unwrap_or(false) {
            debug!("Device '{device_id}' is not enabled – skipping.");
            continue;
        }

        let Some(usb_id) = raw_dev.device_usb_id.as_deref().filter(|s| !s.is_empty()) else {
            warn!(
                "Device '{device_id}' is enabled but has no device_usb_id – skipping. \
                 Run 'swipestr --list-devices' to find your USB ID.",
            );
            continue;
        };

        let engine = raw_dev
            .thresholds
            .merge_with_fallback(&raw.global.thresholds)
            .into_engine_config();
        engine.validate(device_id)?;

        devices.insert(
            device_id.clone(),
            DeviceConfig {
                device_usb_id: usb_id.to_string(),
                gestures: merge_gestures(&raw.global.gestures, &raw_dev.gestures),
                engine,
            },
        );
    }

    Ok(AppConfig {
        log_level: raw.global.log_level.unwrap_or_else(|| "info".to_string()),
        log_file: raw.global.log_file,
        devices,
    })
}
