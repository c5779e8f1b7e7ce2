// src/config/settings.rs
//! Agent configuration settings.
//!
//! This module contains the command line / environment configuration and the
//! validated runtime configuration derived from it. The bot token and the
//! authorized identity are mandatory: the agent refuses to start without them.

use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::command_handler::HandlerConfig;
use crate::config::{constants, defaults};
use crate::types::CallerId;

/// Error type for configuration-related operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Command line arguments for the agent.
///
/// Every option falls back to an environment variable so the agent can be
/// configured entirely through a `.env` file.
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "AeroNyx Sentinel",
    about = "Server monitoring and administration agent controlled over Telegram",
    version,
    author
)]
pub struct AgentArgs {
    /// Telegram bot token
    #[clap(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Identifier of the only user allowed to run privileged commands
    #[clap(long, env = "TELEGRAM_CHAT_ID")]
    pub chat_id: Option<String>,

    /// Telegram Bot API base URL
    #[clap(long, env = "SENTINEL_API_URL", default_value = defaults::DEFAULT_API_URL)]
    pub api_url: String,

    /// Log level
    #[clap(long, env = "SENTINEL_LOG_LEVEL", default_value = defaults::DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Log file, also served by /logs
    #[clap(long, env = "SENTINEL_LOG_FILE", default_value = defaults::DEFAULT_LOG_FILE)]
    pub log_file: String,

    /// Directory for files received through /file
    #[clap(long, env = "SENTINEL_DOWNLOAD_DIR", default_value = defaults::DEFAULT_DOWNLOAD_DIR)]
    pub download_dir: String,

    /// SSH authorized keys file managed by /ssh
    #[clap(long, env = "SENTINEL_AUTHORIZED_KEYS", default_value = defaults::DEFAULT_AUTHORIZED_KEYS)]
    pub authorized_keys: String,

    /// Thermal zone file used when no temperature sensor is exposed
    #[clap(long, env = "SENTINEL_THERMAL_ZONE", default_value = defaults::DEFAULT_THERMAL_ZONE)]
    pub thermal_zone: String,

    /// Initial working directory for /c (defaults to the process directory)
    #[clap(long, env = "SENTINEL_WORKING_DIR")]
    pub working_dir: Option<String>,

    /// Shell used to run commands
    #[clap(long, env = "SENTINEL_SHELL", default_value = defaults::DEFAULT_SHELL)]
    pub shell: String,

    /// Child process timeout in seconds
    #[clap(long, env = "SENTINEL_COMMAND_TIMEOUT", default_value_t = defaults::DEFAULT_COMMAND_TIMEOUT)]
    pub command_timeout: u64,

    /// Maximum size of a received file in bytes
    #[clap(long, env = "SENTINEL_MAX_FILE_SIZE", default_value_t = defaults::DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    /// Listening-socket enumeration command
    #[clap(long, env = "SENTINEL_NETSTAT_COMMAND", default_value = defaults::DEFAULT_NETSTAT_COMMAND)]
    pub netstat_command: String,

    /// Traffic accounting command
    #[clap(long, env = "SENTINEL_TRAFFIC_COMMAND", default_value = defaults::DEFAULT_TRAFFIC_COMMAND)]
    pub traffic_command: String,

    /// Privileged reboot command
    #[clap(long, env = "SENTINEL_REBOOT_COMMAND", default_value = defaults::DEFAULT_REBOOT_COMMAND)]
    pub reboot_command: String,

    /// Critical-event check interval in seconds, 0 disables alerts
    #[clap(long, env = "SENTINEL_ALERT_INTERVAL", default_value_t = defaults::DEFAULT_ALERT_INTERVAL)]
    pub alert_interval: u64,
}

/// Validated agent configuration
#[derive(Clone)]
pub struct AgentConfig {
    /// Telegram bot token
    pub bot_token: String,

    /// The single authorized operator
    pub authorized_id: CallerId,

    /// Telegram Bot API base URL
    pub api_url: String,

    /// Log level
    pub log_level: String,

    /// Log file path
    pub log_file: PathBuf,

    /// Long-poll timeout for incoming updates
    pub poll_timeout: Duration,

    /// Critical-event check interval, `None` when disabled
    pub alert_interval: Option<Duration>,

    /// Dispatcher settings
    pub handler: HandlerConfig,
}

impl AgentConfig {
    /// Create a new agent configuration from command line arguments
    pub fn from_args(args: AgentArgs) -> Result<Self, ConfigError> {
        let bot_token = args
            .bot_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let raw_id = args
            .chat_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_CHAT_ID"))?;
        let authorized_id = raw_id.parse::<CallerId>().map_err(|e| {
            ConfigError::Invalid(format!("TELEGRAM_CHAT_ID must be numeric ({}): {}", raw_id, e))
        })?;

        if args.command_timeout == 0 {
            return Err(ConfigError::Invalid(
                "command timeout must be greater than zero".to_string(),
            ));
        }

        if args.shell.trim().is_empty() {
            return Err(ConfigError::Invalid("shell must not be empty".to_string()));
        }

        let working_dir = match args.working_dir {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        };
        if !working_dir.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "working directory {} does not exist",
                working_dir.display()
            )));
        }

        let log_file = PathBuf::from(&args.log_file);

        let handler = HandlerConfig {
            working_dir,
            shell: args.shell,
            command_timeout: Duration::from_secs(args.command_timeout),
            max_output_chars: constants::MAX_OUTPUT_CHARS,
            authorized_keys_path: PathBuf::from(args.authorized_keys),
            download_dir: PathBuf::from(args.download_dir),
            max_file_size: args.max_file_size,
            log_file: log_file.clone(),
            log_tail_lines: constants::LOG_TAIL_LINES,
            thermal_zone_path: PathBuf::from(args.thermal_zone),
            cpu_sample_interval: constants::CPU_SAMPLE_INTERVAL,
            netstat_command: args.netstat_command,
            traffic_command: args.traffic_command,
            reboot_command: args.reboot_command,
        };

        let alert_interval = if args.alert_interval == 0 {
            None
        } else {
            Some(Duration::from_secs(args.alert_interval))
        };

        Ok(Self {
            bot_token,
            authorized_id,
            api_url: args.api_url.trim_end_matches('/').to_string(),
            log_level: args.log_level,
            log_file,
            poll_timeout: constants::POLL_TIMEOUT,
            alert_interval,
            handler,
        })
    }

    /// Log the effective configuration without secrets
    pub fn log_summary(&self) {
        info!("Authorized operator: {}", self.authorized_id);
        info!("Log file: {}", self.log_file.display());
        info!("Download directory: {}", self.handler.download_dir.display());
        info!("Authorized keys: {}", self.handler.authorized_keys_path.display());
        info!("Command timeout: {}s", self.handler.command_timeout.as_secs());
        match self.alert_interval {
            Some(interval) => info!("Critical-event monitor every {}s", interval.as_secs()),
            None => info!("Critical-event monitor disabled"),
        }
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("bot_token", &"<redacted>")
            .field("authorized_id", &self.authorized_id)
            .field("api_url", &self.api_url)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .field("poll_timeout", &self.poll_timeout)
            .field("alert_interval", &self.alert_interval)
            .field("handler", &self.handler)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> AgentArgs {
        AgentArgs::parse_from([
            "aeronyx-sentinel",
            "--bot-token",
            "123:ABC",
            "--chat-id",
            "4242",
            "--working-dir",
            "/",
        ])
    }

    #[test]
    fn test_config_from_args() {
        let config = AgentConfig::from_args(base_args()).unwrap();
        assert_eq!(config.bot_token, "123:ABC");
        assert_eq!(config.authorized_id, CallerId(4242));
        assert_eq!(config.handler.working_dir, PathBuf::from("/"));
        assert_eq!(config.handler.command_timeout, Duration::from_secs(60));
        assert_eq!(config.alert_interval, Some(Duration::from_secs(300)));
        assert_eq!(config.handler.log_file, config.log_file);
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let mut args = base_args();
        args.bot_token = None;
        let err = AgentConfig::from_args(args).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN")));

        let mut args = base_args();
        args.bot_token = Some("   ".to_string());
        assert!(AgentConfig::from_args(args).is_err());
    }

    #[test]
    fn test_missing_or_invalid_chat_id_is_rejected() {
        let mut args = base_args();
        args.chat_id = None;
        let err = AgentConfig::from_args(args).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_CHAT_ID")));

        let mut args = base_args();
        args.chat_id = Some("operator".to_string());
        let err = AgentConfig::from_args(args).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_alert_interval_disables_monitor() {
        let mut args = base_args();
        args.alert_interval = 0;
        let config = AgentConfig::from_args(args).unwrap();
        assert!(config.alert_interval.is_none());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut args = base_args();
        args.command_timeout = 0;
        assert!(AgentConfig::from_args(args).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = AgentConfig::from_args(base_args()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("123:ABC"));
        assert!(rendered.contains("<redacted>"));
    }
}
