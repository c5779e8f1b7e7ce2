// src/command_handler/config.rs
// ============================================
// Configuration for the command handler
// ============================================

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{constants, defaults};

/// Command handler configuration
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Initial working directory for shell commands
    pub working_dir: PathBuf,
    /// Shell used for `/c` and tool invocations
    pub shell: String,
    /// Child process timeout
    pub command_timeout: Duration,
    /// Maximum characters of command output in a reply
    pub max_output_chars: usize,
    /// SSH authorized keys file
    pub authorized_keys_path: PathBuf,
    /// Directory for received files
    pub download_dir: PathBuf,
    /// Maximum size of a received file
    pub max_file_size: u64,
    /// Agent log file
    pub log_file: PathBuf,
    /// Lines returned by `/logs`
    pub log_tail_lines: usize,
    /// Thermal zone fallback for the CPU temperature
    pub thermal_zone_path: PathBuf,
    /// CPU utilization sampling window
    pub cpu_sample_interval: Duration,
    /// Listening-socket enumeration command
    pub netstat_command: String,
    /// Traffic accounting command
    pub traffic_command: String,
    /// Privileged reboot command
    pub reboot_command: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("/"),
            shell: defaults::DEFAULT_SHELL.to_string(),
            command_timeout: Duration::from_secs(defaults::DEFAULT_COMMAND_TIMEOUT),
            max_output_chars: constants::MAX_OUTPUT_CHARS,
            authorized_keys_path: PathBuf::from(defaults::DEFAULT_AUTHORIZED_KEYS),
            download_dir: PathBuf::from(defaults::DEFAULT_DOWNLOAD_DIR),
            max_file_size: defaults::DEFAULT_MAX_FILE_SIZE,
            log_file: PathBuf::from(defaults::DEFAULT_LOG_FILE),
            log_tail_lines: constants::LOG_TAIL_LINES,
            thermal_zone_path: PathBuf::from(defaults::DEFAULT_THERMAL_ZONE),
            cpu_sample_interval: constants::CPU_SAMPLE_INTERVAL,
            netstat_command: defaults::DEFAULT_NETSTAT_COMMAND.to_string(),
            traffic_command: defaults::DEFAULT_TRAFFIC_COMMAND.to_string(),
            reboot_command: defaults::DEFAULT_REBOOT_COMMAND.to_string(),
        }
    }
}

impl HandlerConfig {
    /// Create a configuration whose files all live under `root`
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            working_dir: root.clone(),
            authorized_keys_path: root.join(".ssh").join("authorized_keys"),
            download_dir: root.join("downloads"),
            log_file: root.join("logs").join("sentinel.log"),
            thermal_zone_path: root.join("thermal_zone0_temp"),
            ..Self::default()
        }
    }
}
