// src/config/constants.rs
//! Application constants and fixed settings.
//!
//! This module contains fixed values that are used throughout the application,
//! such as timeouts, output limits, and alert thresholds.

use std::time::Duration;

/// Chat limits
pub const MAX_OUTPUT_CHARS: usize = 3500; // Telegram caps messages at 4096 chars
pub const LOG_TAIL_LINES: usize = 10;
pub const TOP_PROCESS_COUNT: usize = 5;

/// Metrics sampling
pub const CPU_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Transport polling
pub const POLL_TIMEOUT: Duration = Duration::from_secs(30);
pub const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Critical-event thresholds
pub const CPU_ALERT_PERCENT: f32 = 90.0;
pub const MEMORY_ALERT_PERCENT: f32 = 90.0;
pub const DISK_ALERT_PERCENT: f32 = 90.0;
pub const TEMPERATURE_ALERT_CELSIUS: f32 = 80.0;

/// Audit logging
pub const MAX_AUDIT_ARGS_CHARS: usize = 200;

/// Log tail window, grown up to the maximum when lines are long
pub const LOG_TAIL_WINDOW_BYTES: u64 = 16 * 1024;
pub const MAX_LOG_TAIL_WINDOW_BYTES: u64 = 1024 * 1024;
