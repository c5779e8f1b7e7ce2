// src/utils/logging.rs
//! Logging utilities for the application.
//!
//! This module provides functions for initializing and configuring
//! the logging system. Everything logged at or above the configured level
//! goes both to the console and to the agent log file, which is what
//! `/logs` reads back.

use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn build_filter(log_level: &str) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::new(log_level), // Use provided level as fallback
    }
}

/// Sets up file-based logging in addition to console output.
///
/// The returned guard flushes the non-blocking writer on drop; keep it alive
/// for the lifetime of the process.
pub fn init_logging(log_level: &str, log_file: &Path) -> io::Result<WorkerGuard> {
    let log_dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(log_dir)?;

    let file_name = log_file.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Log file path has no file name: {}", log_file.display()),
        )
    })?;

    // A single append-only file: /logs tails it by path
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_writer(non_blocking_writer)
        .with_ansi(false);

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stdout)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(file_layer.with_filter(build_filter(log_level)))
        .with(console_layer.with_filter(build_filter(log_level)))
        .try_init()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to set global default subscriber: {}", e),
            )
        })?;

    Ok(guard)
}

/// Log a security event with structured fields
pub fn log_security_event(event_type: &str, details: &str) {
    tracing::warn!(
        security_event.type = event_type,
        security_event.details = details,
        "Security event: [{}] {}",
        event_type,
        details
    );
}
