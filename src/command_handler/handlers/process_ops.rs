// src/command_handler/handlers/process_ops.rs
// ============================================
// Process listing handler
// ============================================

use std::cmp::Ordering;

use super::common::query_metrics;
use crate::command_handler::{CommandError, CommandHandler, CommandReply};
use crate::config::constants::TOP_PROCESS_COUNT;
use crate::metrics::{clamp_percent, ProcessSample};
use crate::utils::security::escape_html;

/// The `count` busiest processes, highest CPU first.
///
/// The sort is stable, so equal CPU values keep snapshot order.
pub fn top_processes(mut samples: Vec<ProcessSample>, count: usize) -> Vec<ProcessSample> {
    samples.sort_by(|a, b| compare_cpu(b.cpu_percent, a.cpu_percent));
    samples.truncate(count);
    samples
}

fn compare_cpu(a: f32, b: f32) -> Ordering {
    let a = if a.is_nan() { 0.0 } else { a };
    let b = if b.is_nan() { 0.0 } else { b };
    a.total_cmp(&b)
}

/// Render a process list as chat HTML
pub fn format_processes(samples: &[ProcessSample]) -> String {
    let mut response = String::from("📊 <b>Top processes:</b>");
    if samples.is_empty() {
        response.push_str("\n(no processes)");
    }
    for p in samples {
        response.push_str(&format!(
            "\n• PID: {}, Name: {}, CPU: {:.1}%, RAM: {:.1}%",
            p.pid,
            escape_html(&p.name),
            p.cpu_percent,
            clamp_percent(p.memory_percent)
        ));
    }
    response
}

/// Handle `/top`
pub async fn handle_top(handler: &CommandHandler) -> Result<CommandReply, CommandError> {
    let interval = handler.config().cpu_sample_interval;
    let samples = query_metrics(handler.metrics(), move |metrics| metrics.processes(interval)).await?;

    let top = top_processes(samples, TOP_PROCESS_COUNT);
    Ok(CommandReply::html(format_processes(&top)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pid: u32, cpu: f32) -> ProcessSample {
        ProcessSample {
            pid,
            name: format!("proc{}", pid),
            cpu_percent: cpu,
            memory_percent: 1.0,
        }
    }

    #[test]
    fn test_top_sorted_descending() {
        let snapshot = vec![
            sample(1, 0.5),
            sample(2, 30.0),
            sample(3, 12.0),
            sample(4, 99.0),
            sample(5, 0.0),
            sample(6, 45.0),
            sample(7, 3.0),
        ];
        let pids: Vec<u32> = top_processes(snapshot, 5).iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![4, 6, 2, 3, 7]);
    }

    #[test]
    fn test_ties_keep_snapshot_order() {
        let snapshot = vec![sample(10, 5.0), sample(11, 7.0), sample(12, 5.0), sample(13, 5.0)];
        let pids: Vec<u32> = top_processes(snapshot, 5).iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![11, 10, 12, 13]);
    }

    #[test]
    fn test_nan_sorts_as_idle() {
        let snapshot = vec![sample(1, f32::NAN), sample(2, 1.0), sample(3, 0.0)];
        let pids: Vec<u32> = top_processes(snapshot, 5).iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![2, 1, 3]);
    }

    #[test]
    fn test_fewer_than_requested() {
        assert_eq!(top_processes(vec![sample(1, 1.0)], 5).len(), 1);
        assert!(top_processes(Vec::new(), 5).is_empty());
    }

    #[test]
    fn test_format_escapes_names() {
        let mut p = sample(42, 12.34);
        p.name = "<evil>".to_string();
        let html = format_processes(&[p]);
        assert!(html.contains("PID: 42, Name: &lt;evil&gt;, CPU: 12.3%, RAM: 1.0%"));
    }
}
