// src/config/defaults.rs
//! Default configurations for the AeroNyx Sentinel agent.
//!
//! This module provides sensible default values for configuration settings
//! when not explicitly specified by the user.

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log file, read back by `/logs`
pub const DEFAULT_LOG_FILE: &str = "logs/sentinel.log";

/// Default directory for files received through `/file`
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Default SSH authorized keys file
pub const DEFAULT_AUTHORIZED_KEYS: &str = "/root/.ssh/authorized_keys";

/// Default thermal zone pseudo-file (millidegrees Celsius)
pub const DEFAULT_THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Default Telegram Bot API endpoint
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default shell used for `/c` and tool invocations
pub const DEFAULT_SHELL: &str = "sh";

/// Default listening-socket enumeration tool
pub const DEFAULT_NETSTAT_COMMAND: &str = "netstat -tuln";

/// Default traffic accounting tool
pub const DEFAULT_TRAFFIC_COMMAND: &str = "vnstat";

/// Default privileged reboot command
pub const DEFAULT_REBOOT_COMMAND: &str = "sudo reboot";

/// Default child process timeout in seconds
pub const DEFAULT_COMMAND_TIMEOUT: u64 = 60;

/// Default critical-event check interval in seconds (0 disables the monitor)
pub const DEFAULT_ALERT_INTERVAL: u64 = 300;

/// Default maximum size of a received file in bytes
pub const DEFAULT_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024; // 20MB, Bot API download limit
