// Export all modules for public use
pub mod agent;
pub mod command_handler;
pub mod config;
pub mod metrics;
pub mod monitor;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export the most commonly used items for convenience
pub use crate::agent::Agent;
pub use crate::command_handler::{Command, CommandError, CommandHandler, CommandReply, HandlerConfig};
pub use crate::config::{AgentArgs, AgentConfig, ConfigError};
pub use crate::metrics::{MetricsProvider, SystemMetricsProvider};
pub use crate::transport::{ChatTransport, IncomingMessage, TelegramTransport};
pub use crate::types::{CallerId, ChatId};
