// src/command_handler/handlers/status_ops.rs
// ============================================
// Server status handler
// ============================================

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::common::query_metrics;
use crate::command_handler::{CommandError, CommandHandler, CommandReply};
use crate::metrics::{clamp_percent, MetricsError, MetricsProvider};
use crate::utils::system::read_thermal_zone;

/// Snapshot of the headline host metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
    /// `None` when neither the sensor API nor the thermal zone answered
    pub temperature: Option<f32>,
}

impl StatusReport {
    /// Render the report as chat HTML
    pub fn to_html(&self) -> String {
        let temperature = match self.temperature {
            Some(celsius) => format!("{:.1}°C", celsius),
            None => "N/A".to_string(),
        };

        format!(
            "📊 <b>Server status:</b>\n\
             • <b>CPU:</b> {:.1}%\n\
             • <b>RAM:</b> {:.1}%\n\
             • <b>Disk:</b> {:.1}%\n\
             • <b>CPU temperature:</b> {}",
            self.cpu_percent, self.memory_percent, self.disk_percent, temperature
        )
    }
}

/// Collect CPU, memory, disk and temperature. Blocks for `cpu_interval`.
pub fn collect_status(
    metrics: &dyn MetricsProvider,
    cpu_interval: Duration,
    thermal_zone: &Path,
) -> Result<StatusReport, MetricsError> {
    Ok(StatusReport {
        cpu_percent: clamp_percent(metrics.cpu_usage(cpu_interval)?),
        memory_percent: clamp_percent(metrics.memory_usage()?),
        disk_percent: clamp_percent(metrics.disk_usage()?),
        temperature: read_cpu_temperature(metrics, thermal_zone),
    })
}

/// Sensor API first, then the thermal zone pseudo-file
pub fn read_cpu_temperature(metrics: &dyn MetricsProvider, thermal_zone: &Path) -> Option<f32> {
    match metrics.sensor_temperature() {
        Ok(celsius) => return Some(celsius),
        Err(e) => debug!("Sensor temperature unavailable: {}", e),
    }

    match read_thermal_zone(thermal_zone) {
        Ok(celsius) => Some(celsius),
        Err(e) => {
            debug!(
                "Thermal zone {} unreadable: {}",
                thermal_zone.display(),
                e
            );
            None
        }
    }
}

/// Handle `/status`
pub async fn handle_status(handler: &CommandHandler) -> Result<CommandReply, CommandError> {
    let interval = handler.config().cpu_sample_interval;
    let thermal_zone: PathBuf = handler.config().thermal_zone_path.clone();

    let report = query_metrics(handler.metrics(), move |metrics| {
        collect_status(metrics, interval, &thermal_zone)
    })
    .await?;

    Ok(CommandReply::html(report.to_html()))
}
