// src/metrics/system.rs
//! Metrics provider backed by the local operating system.
//!
//! Memory, OS identity and core count come from `sys-info`; CPU sampling,
//! the process table, disks and temperature sensors come from `sysinfo`.

use std::path::Path;
use std::time::Duration;
use sysinfo::{Components, Disks, ProcessesToUpdate, System, MINIMUM_CPU_UPDATE_INTERVAL};
use tracing::debug;

use super::{HostInfo, MetricsError, MetricsProvider, ProcessSample};

/// Sensor labels that report the CPU package temperature
const CPU_SENSOR_LABELS: &[&str] = &["coretemp", "package id", "tctl", "tdie", "cpu", "k10temp"];

/// Metrics provider for the host the agent runs on
#[derive(Debug, Default)]
pub struct SystemMetricsProvider;

impl SystemMetricsProvider {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsProvider for SystemMetricsProvider {
    fn cpu_usage(&self, interval: Duration) -> Result<f32, MetricsError> {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        std::thread::sleep(interval.max(MINIMUM_CPU_UPDATE_INTERVAL));
        sys.refresh_cpu_usage();

        if sys.cpus().is_empty() {
            return Err(MetricsError::unavailable("cpu", "no CPUs reported"));
        }
        Ok(sys.global_cpu_usage())
    }

    fn memory_usage(&self) -> Result<f32, MetricsError> {
        let mem = sys_info::mem_info()
            .map_err(|e| MetricsError::unavailable("memory", e.to_string()))?;

        if mem.total == 0 {
            return Err(MetricsError::unavailable("memory", "total memory reported as zero"));
        }
        let used = mem.total.saturating_sub(mem.avail);
        Ok((used as f64 / mem.total as f64 * 100.0) as f32)
    }

    fn disk_usage(&self) -> Result<f32, MetricsError> {
        let disks = Disks::new_with_refreshed_list();
        if let Some(root) = disks
            .list()
            .iter()
            .find(|disk| disk.mount_point() == Path::new("/"))
        {
            let total = root.total_space();
            if total > 0 {
                let used = total.saturating_sub(root.available_space());
                return Ok((used as f64 / total as f64 * 100.0) as f32);
            }
        }

        debug!("Root mount not listed, falling back to sys-info disk totals");
        let disk = sys_info::disk_info()
            .map_err(|e| MetricsError::unavailable("disk", e.to_string()))?;
        if disk.total == 0 {
            return Err(MetricsError::unavailable("disk", "total space reported as zero"));
        }
        let used = disk.total.saturating_sub(disk.free);
        Ok((used as f64 / disk.total as f64 * 100.0) as f32)
    }

    fn sensor_temperature(&self) -> Result<f32, MetricsError> {
        let components = Components::new_with_refreshed_list();

        components
            .list()
            .iter()
            .filter(|component| {
                let label = component.label().to_lowercase();
                CPU_SENSOR_LABELS.iter().any(|known| label.contains(known))
            })
            .find_map(|component| component.temperature())
            .filter(|celsius| celsius.is_finite())
            .ok_or_else(|| MetricsError::unavailable("temperature", "no CPU sensor found"))
    }

    fn processes(&self, interval: Duration) -> Result<Vec<ProcessSample>, MetricsError> {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_processes(ProcessesToUpdate::All, true);
        // Per-process CPU usage is a delta between two refreshes
        std::thread::sleep(interval.max(MINIMUM_CPU_UPDATE_INTERVAL));
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let total_memory = sys.total_memory();
        let mut samples: Vec<ProcessSample> = sys
            .processes()
            .values()
            .filter(|process| process.thread_kind().is_none())
            .map(|process| ProcessSample {
                pid: process.pid().as_u32(),
                name: process.name().to_string_lossy().into_owned(),
                cpu_percent: process.cpu_usage(),
                memory_percent: if total_memory == 0 {
                    0.0
                } else {
                    (process.memory() as f64 / total_memory as f64 * 100.0) as f32
                },
            })
            .collect();

        if samples.is_empty() {
            return Err(MetricsError::unavailable("processes", "process table is empty"));
        }

        samples.sort_by_key(|sample| sample.pid);
        Ok(samples)
    }

    fn host_info(&self) -> Result<HostInfo, MetricsError> {
        let os_release = sys_info::os_release()
            .map_err(|e| MetricsError::unavailable("os release", e.to_string()))?;
        let os_name = sys_info::os_type().unwrap_or_else(|_| std::env::consts::OS.to_string());

        let cpu_cores = match sys_info::cpu_num() {
            Ok(cores) if cores > 0 => cores as usize,
            _ => std::thread::available_parallelism()
                .map(|n| n.get())
                .map_err(|e| MetricsError::unavailable("cpu cores", e.to_string()))?,
        };

        Ok(HostInfo {
            hostname: gethostname::gethostname().to_string_lossy().to_string(),
            os_name,
            os_release,
            cpu_cores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_info_collection() {
        let provider = SystemMetricsProvider::new();
        let info = provider.host_info().unwrap();
        assert!(!info.hostname.is_empty());
        assert!(!info.os_name.is_empty());
        assert!(info.cpu_cores > 0);
    }

    #[test]
    fn test_memory_usage_in_range() {
        let provider = SystemMetricsProvider::new();
        match provider.memory_usage() {
            Ok(percent) => assert!((0.0..=100.0).contains(&percent)),
            Err(e) => println!("Memory usage unavailable: {}", e),
        }
    }

    #[test]
    fn test_process_snapshot_is_ordered_by_pid() {
        let provider = SystemMetricsProvider::new();
        match provider.processes(Duration::from_millis(0)) {
            Ok(samples) => {
                assert!(samples.windows(2).all(|w| w[0].pid < w[1].pid));
                assert!(samples.iter().any(|s| s.pid == std::process::id()));
            }
            Err(e) => println!("Process snapshot unavailable: {}", e),
        }
    }
}
