// src/command_handler/models.rs
// ============================================
// Data structures for command handling
// ============================================

use std::time::Duration;

use super::parser::ParseError;
use crate::metrics::MetricsError;
use crate::transport::TransportError;
use crate::utils::security::escape_html;

/// Fixed reply for callers other than the authorized operator
pub const DENIAL_MESSAGE: &str = "❌ You are not allowed to run commands on this server.";

/// Reply delivered to the chat, already formatted as HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub success: bool,
    pub text: String,
}

impl CommandReply {
    /// Successful reply with pre-formatted HTML
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
        }
    }

    /// Failed reply with pre-formatted HTML
    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            success: false,
            text: text.into(),
        }
    }
}

/// Error raised by a command handler
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("access denied")]
    Unauthorized,

    #[error("/{command} requires {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("{0}")]
    Usage(String),

    #[error("unknown command /{0}")]
    UnknownCommand(String),

    #[error("{0}")]
    Execution(String),

    #[error("command timed out after {}", format_timeout(.0))]
    Timeout(Duration),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    SensorUnavailable(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Seconds for whole-second timeouts, milliseconds below one second
fn format_timeout(duration: &Duration) -> String {
    if duration.as_secs() == 0 {
        format!("{} ms", duration.as_millis())
    } else {
        format!("{} seconds", duration.as_secs())
    }
}

impl CommandError {
    /// Wrap an I/O error with what was being attempted
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CommandError::Io {
            context: context.into(),
            source,
        }
    }

    /// Stable code used in audit logs
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Unauthorized => "PERMISSION_DENIED",
            CommandError::MissingArgument { .. } => "MISSING_ARGUMENT",
            CommandError::Usage(_) => "INVALID_COMMAND",
            CommandError::UnknownCommand(_) => "UNKNOWN_COMMAND",
            CommandError::Execution(_) => "SYSTEM_ERROR",
            CommandError::Timeout(_) => "TIMEOUT",
            CommandError::Io { .. } => "IO_ERROR",
            CommandError::SensorUnavailable(_) => "SENSOR_UNAVAILABLE",
            CommandError::Transport(_) => "TRANSPORT_ERROR",
        }
    }

    /// User-facing message for this error
    pub fn to_reply(&self) -> CommandReply {
        let text = match self {
            CommandError::Unauthorized => DENIAL_MESSAGE.to_string(),
            CommandError::MissingArgument { .. } | CommandError::Usage(_) => {
                format!("❌ {}", escape_html(&self.to_string()))
            }
            CommandError::UnknownCommand(_) => format!(
                "❌ {}. Use /help for the list of commands.",
                escape_html(&self.to_string())
            ),
            _ => format!("❌ Error:\n<pre>{}</pre>", escape_html(&self.to_string())),
        };
        CommandReply::failure(text)
    }
}

impl From<ParseError> for CommandError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MissingArgument { command, what } => {
                CommandError::MissingArgument { command, what }
            }
            ParseError::UnknownCommand(name) => CommandError::UnknownCommand(name),
            other => CommandError::Usage(other.to_string()),
        }
    }
}

impl From<MetricsError> for CommandError {
    fn from(err: MetricsError) -> Self {
        CommandError::SensorUnavailable(err.to_string())
    }
}
