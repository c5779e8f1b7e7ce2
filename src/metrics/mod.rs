// src/metrics/mod.rs
//! Host metrics collection.
//!
//! Handlers query the host through [`MetricsProvider`]. Every method may
//! block (CPU utilization is sampled over an interval), so callers run them
//! on the blocking thread pool.

pub mod system;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use system::SystemMetricsProvider;

/// Error type for metrics queries
#[derive(Debug, Clone, thiserror::Error)]
pub enum MetricsError {
    #[error("{metric} unavailable: {reason}")]
    Unavailable { metric: &'static str, reason: String },
}

impl MetricsError {
    pub fn unavailable(metric: &'static str, reason: impl Into<String>) -> Self {
        MetricsError::Unavailable {
            metric,
            reason: reason.into(),
        }
    }
}

/// One entry of a live process snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_percent: f32,
}

/// Static host identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    pub os_name: String,
    pub os_release: String,
    pub cpu_cores: usize,
}

/// Source of host metrics
#[cfg_attr(test, mockall::automock)]
pub trait MetricsProvider: Send + Sync {
    /// Overall CPU utilization in percent, sampled over `interval`
    fn cpu_usage(&self, interval: Duration) -> Result<f32, MetricsError>;

    /// Used memory in percent
    fn memory_usage(&self) -> Result<f32, MetricsError>;

    /// Used space of the root filesystem in percent
    fn disk_usage(&self) -> Result<f32, MetricsError>;

    /// CPU temperature in degrees Celsius from the sensor API
    fn sensor_temperature(&self) -> Result<f32, MetricsError>;

    /// Live process snapshot ordered by pid, CPU sampled over `interval`
    fn processes(&self, interval: Duration) -> Result<Vec<ProcessSample>, MetricsError>;

    /// Host name, OS and core count
    fn host_info(&self) -> Result<HostInfo, MetricsError>;
}

/// Clamp a percentage into [0, 100], mapping NaN to 0
pub fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
