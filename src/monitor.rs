// src/monitor.rs
//! Critical-event monitoring.
//!
//! Periodically samples CPU, memory, disk and temperature and warns the
//! operator when a value crosses its threshold. Alerts are edge-triggered:
//! a warning is sent when a condition becomes active and is not repeated
//! until it has cleared and tripped again.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::command_handler::handlers::common::query_metrics;
use crate::command_handler::handlers::status_ops::{collect_status, StatusReport};
use crate::command_handler::CommandError;
use crate::config::constants::{
    CPU_ALERT_PERCENT, DISK_ALERT_PERCENT, MEMORY_ALERT_PERCENT, TEMPERATURE_ALERT_CELSIUS,
};
use crate::metrics::MetricsProvider;
use crate::transport::ChatTransport;
use crate::types::ChatId;

/// A threshold that can trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlertKind {
    Cpu,
    Memory,
    Disk,
    Temperature,
}

impl AlertKind {
    /// Chat warning for this condition
    pub fn message(&self) -> String {
        match self {
            AlertKind::Cpu => format!(
                "⚠️ <b>Warning!</b> CPU usage is above {:.0}%.",
                CPU_ALERT_PERCENT
            ),
            AlertKind::Memory => format!(
                "⚠️ <b>Warning!</b> RAM usage is above {:.0}%.",
                MEMORY_ALERT_PERCENT
            ),
            AlertKind::Disk => format!(
                "⚠️ <b>Warning!</b> Disk is more than {:.0}% full.",
                DISK_ALERT_PERCENT
            ),
            AlertKind::Temperature => format!(
                "⚠️ <b>Warning!</b> CPU temperature is above {:.0}°C.",
                TEMPERATURE_ALERT_CELSIUS
            ),
        }
    }
}

/// Conditions currently over their threshold
pub fn evaluate(report: &StatusReport) -> BTreeSet<AlertKind> {
    let mut active = BTreeSet::new();
    if report.cpu_percent > CPU_ALERT_PERCENT {
        active.insert(AlertKind::Cpu);
    }
    if report.memory_percent > MEMORY_ALERT_PERCENT {
        active.insert(AlertKind::Memory);
    }
    if report.disk_percent > DISK_ALERT_PERCENT {
        active.insert(AlertKind::Disk);
    }
    if matches!(report.temperature, Some(celsius) if celsius > TEMPERATURE_ALERT_CELSIUS) {
        active.insert(AlertKind::Temperature);
    }
    active
}

/// Periodic threshold checker
pub struct CriticalEventMonitor {
    metrics: Arc<dyn MetricsProvider>,
    chat: ChatId,
    interval: Duration,
    cpu_sample_interval: Duration,
    thermal_zone: PathBuf,
    active: BTreeSet<AlertKind>,
}

impl CriticalEventMonitor {
    pub fn new(
        metrics: Arc<dyn MetricsProvider>,
        chat: ChatId,
        interval: Duration,
        cpu_sample_interval: Duration,
        thermal_zone: PathBuf,
    ) -> Self {
        Self {
            metrics,
            chat,
            interval,
            cpu_sample_interval,
            thermal_zone,
            active: BTreeSet::new(),
        }
    }

    /// Record the current conditions and return those that just became active
    pub fn new_alerts(&mut self, current: BTreeSet<AlertKind>) -> Vec<AlertKind> {
        let fresh: Vec<AlertKind> = current.difference(&self.active).copied().collect();
        for cleared in self.active.difference(&current) {
            info!("Condition cleared: {:?}", cleared);
        }
        self.active = current;
        fresh
    }

    /// Sample once and send warnings for newly tripped thresholds
    pub async fn check(&mut self, transport: &dyn ChatTransport) -> Result<usize, CommandError> {
        let cpu_interval = self.cpu_sample_interval;
        let thermal_zone = self.thermal_zone.clone();
        let report = query_metrics(&self.metrics, move |metrics| {
            collect_status(metrics, cpu_interval, &thermal_zone)
        })
        .await?;
        debug!("Monitor sample: {:?}", report);

        let alerts = self.new_alerts(evaluate(&report));
        for alert in &alerts {
            warn!("Critical condition: {:?}", alert);
            transport.send_text(self.chat, &alert.message()).await?;
        }
        Ok(alerts.len())
    }

    /// Check every interval until the task is dropped
    pub async fn run(mut self, transport: Arc<dyn ChatTransport>) {
        info!(
            "Critical-event monitor started (every {}s)",
            self.interval.as_secs()
        );
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.check(transport.as_ref()).await {
                warn!("Critical-event check failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MockMetricsProvider;
    use crate::transport::{Attachment, IncomingMessage, TransportError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn report(cpu: f32, memory: f32, disk: f32, temperature: Option<f32>) -> StatusReport {
        StatusReport {
            cpu_percent: cpu,
            memory_percent: memory,
            disk_percent: disk,
            temperature,
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn receive(&self) -> Result<Vec<IncomingMessage>, TransportError> {
            Ok(Vec::new())
        }

        async fn send_text(&self, _chat: ChatId, text: &str) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn fetch_attachment(&self, _attachment: &Attachment) -> Result<Vec<u8>, TransportError> {
            Err(TransportError::AttachmentUnavailable("not supported".to_string()))
        }
    }

    #[test]
    fn test_evaluate_thresholds() {
        assert!(evaluate(&report(10.0, 20.0, 30.0, Some(40.0))).is_empty());
        assert!(evaluate(&report(90.0, 90.0, 90.0, Some(80.0))).is_empty());

        let all = evaluate(&report(95.0, 91.0, 99.0, Some(85.0)));
        assert_eq!(
            all.into_iter().collect::<Vec<_>>(),
            vec![AlertKind::Cpu, AlertKind::Memory, AlertKind::Disk, AlertKind::Temperature]
        );

        assert!(evaluate(&report(10.0, 10.0, 10.0, None)).is_empty());
    }

    #[test]
    fn test_alerts_are_edge_triggered() {
        let mut monitor = CriticalEventMonitor::new(
            Arc::new(MockMetricsProvider::new()),
            ChatId(1),
            Duration::from_secs(300),
            Duration::ZERO,
            PathBuf::from("/nonexistent"),
        );

        let cpu_hot = evaluate(&report(95.0, 10.0, 10.0, None));
        assert_eq!(monitor.new_alerts(cpu_hot.clone()), vec![AlertKind::Cpu]);
        assert!(monitor.new_alerts(cpu_hot.clone()).is_empty());

        let both = evaluate(&report(95.0, 10.0, 95.0, None));
        assert_eq!(monitor.new_alerts(both), vec![AlertKind::Disk]);

        monitor.new_alerts(BTreeSet::new());
        assert_eq!(monitor.new_alerts(cpu_hot), vec![AlertKind::Cpu]);
    }

    #[tokio::test]
    async fn test_check_sends_warnings_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut metrics = MockMetricsProvider::new();
        metrics.expect_cpu_usage().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(97.0)
        });
        metrics.expect_memory_usage().returning(|| Ok(30.0));
        metrics.expect_disk_usage().returning(|| Ok(30.0));
        metrics.expect_sensor_temperature().returning(|| Ok(85.0));

        let mut monitor = CriticalEventMonitor::new(
            Arc::new(metrics),
            ChatId(42),
            Duration::from_secs(300),
            Duration::ZERO,
            PathBuf::from("/nonexistent"),
        );
        let transport = RecordingTransport::default();

        assert_eq!(monitor.check(&transport).await.unwrap(), 2);
        assert_eq!(monitor.check(&transport).await.unwrap(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("CPU usage is above 90%"));
        assert!(sent[1].contains("CPU temperature is above 80°C"));
    }
}
