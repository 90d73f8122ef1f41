//! swipestr – Tap, swipe and long-press gestures for Linux touchscreens.
//!
//! CLI entry point.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::sync::atomic::Ordering;
use std::time::SystemTime;

use clap::Parser;
use log::{LevelFilter, Log, Metadata, Record};

use swipestr::manager::{GestureManager, list_touch_devices};

#[derive(Parser)]
#[command(
    name = "swipestr",
    about = "Tap, swipe and long-press gestures for touchscreens"
)]
struct Cli {
    /// Path to configuration file
    #[arg(default_value = "/etc/swipestr/gestures.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// List available touchscreen devices and exit
    #[arg(short, long)]
    list_devices: bool,
}

/// Writes `[<unix secs> <LEVEL> swipestr] <message>` lines to stderr and,
/// if configured, appends them to a log file.
struct SwipestrLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl Log for SwipestrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("swipestr")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let line = format!("[{secs} {} swipestr] {}\n", record.level(), record.args());

        // stderr ends up in journald when running as a systemd service
        eprint!("{line}");

        if let Some(Ok(mut f)) = self.file.as_ref().map(Mutex::lock) {
            let _ = f.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Some(Ok(mut f)) = self.file.as_ref().map(Mutex::lock) {
            let _ = f.flush();
        }
    }
}

/// Install the logger.  `--verbose` overrides the configured level.
fn init_logging(verbose: bool, config_level: &str, log_file: Option<&str>) -> Result<(), String> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        config_level.parse().unwrap_or(LevelFilter::Info)
    };

    let file = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Mutex::new(file)),
            Err(e) => {
                eprintln!("Warning: cannot open log file '{path}': {e}");
                None
            }
        }
    });

    log::set_boxed_logger(Box::new(SwipestrLogger { level, file }))
        .map_err(|e| format!("Failed to set logger: {e}"))?;
    log::set_max_level(level);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_devices {
        return list_touch_devices();
    }

    // Parse config first (before logger init) so we can read the configured log level.
    let mut manager = match GestureManager::new(&cli.config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!(
                "Error: {e}\n\n\
                 To find available touchscreen devices, run:\n\
                 \x20 swipestr --list-devices"
            );
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(
        cli.verbose,
        manager.config_log_level(),
        manager.config_log_file(),
    ) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let running = manager.running_flag();
    if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::Relaxed)) {
        log::error!("Error setting Ctrl-C handler: {e}");
        return ExitCode::FAILURE;
    }

    log::info!("Loading configuration from: {}", cli.config.display());
    manager.start();

    ExitCode::SUCCESS
}
