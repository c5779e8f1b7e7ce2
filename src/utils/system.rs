// src/utils/system.rs
//! System-related utilities.
//!
//! This module provides helpers for interacting with the operating system
//! that sit below the metrics provider: thermal zone parsing and home
//! directory resolution.

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a thermal zone pseudo-file and convert millidegrees to degrees Celsius
pub fn read_thermal_zone(path: &Path) -> io::Result<f32> {
    let raw = std::fs::read_to_string(path)?;
    parse_thermal_zone(&raw).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Could not parse temperature from {}", path.display()),
        )
    })
}

fn parse_thermal_zone(raw: &str) -> Option<f32> {
    let millidegrees = raw.trim().parse::<i64>().ok()?;
    let celsius = millidegrees as f32 / 1000.0;
    debug!("Thermal zone reports {:.1}°C", celsius);
    Some(celsius)
}

/// Get the home directory of the user running the agent
pub fn home_dir() -> io::Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "HOME is not set"))
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> io::Result<PathBuf> {
    if path == "~" {
        return home_dir();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    Ok(PathBuf::from(path))
}
