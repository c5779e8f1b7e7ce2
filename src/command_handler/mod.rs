// src/command_handler/mod.rs
// ============================================
// Chat command dispatcher
// ============================================
//
// Receives parsed chat messages, authorizes the caller and routes each
// command to exactly one handler. Handler failures are turned into chat
// replies here; nothing below this point can stop the agent loop.

pub mod config;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod session;
pub mod utils;
pub mod validation;

use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub use config::HandlerConfig;
pub use models::{CommandError, CommandReply, DENIAL_MESSAGE};
pub use parser::{Command, Invocation, ParseError, SshAction};
pub use session::ShellSession;

use crate::metrics::MetricsProvider;
use crate::transport::{ChatTransport, IncomingMessage};
use crate::types::{CallerId, ChatId};
use crate::utils::logging::log_security_event;
use crate::utils::security::sanitize_log_input;
use handlers::{
    execute_ops, file_ops, info_ops, log_ops, network_ops, power_ops, process_ops, ssh_ops,
    status_ops, system_ops,
};

/// Command dispatcher for a single authorized operator
pub struct CommandHandler {
    config: HandlerConfig,
    authorized: CallerId,
    session: ShellSession,
    metrics: Arc<dyn MetricsProvider>,
}

impl CommandHandler {
    /// Create a new command handler
    pub fn new(config: HandlerConfig, authorized: CallerId, metrics: Arc<dyn MetricsProvider>) -> Self {
        let session = ShellSession::new(
            config.working_dir.clone(),
            config.shell.clone(),
            config.command_timeout,
        );
        Self {
            config,
            authorized,
            session,
            metrics,
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn authorized(&self) -> CallerId {
        self.authorized
    }

    pub fn session(&self) -> &ShellSession {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut ShellSession {
        &mut self.session
    }

    pub(crate) fn metrics(&self) -> &Arc<dyn MetricsProvider> {
        &self.metrics
    }

    /// Handle one incoming chat message.
    ///
    /// Returns `None` for messages that are not commands.
    pub async fn handle_message(
        &mut self,
        message: &IncomingMessage,
        transport: &dyn ChatTransport,
    ) -> Option<CommandReply> {
        let invocation = match Invocation::parse(&message.text) {
            Ok(invocation) => invocation,
            Err(_) => {
                debug!("Ignoring non-command message from {}", message.caller);
                return None;
            }
        };

        if !invocation.is_public() && !validation::is_authorized(self.authorized, message.caller) {
            log_security_event(
                "UNAUTHORIZED_COMMAND",
                &format!(
                    "caller={} cmd=/{}",
                    message.caller,
                    sanitize_log_input(&invocation.name)
                ),
            );
            return Some(CommandError::Unauthorized.to_reply());
        }

        let start = Instant::now();
        let result = match Command::parse(&invocation, &message.attachments) {
            Ok(command) => self.dispatch(command, message.chat, transport).await,
            Err(e) => Err(CommandError::from(e)),
        };

        utils::logging::log_command(
            message.caller,
            &invocation.name,
            &invocation.args,
            &result,
            start.elapsed(),
        );

        Some(result.unwrap_or_else(|e| e.to_reply()))
    }

    /// Route a parsed command to its handler
    async fn dispatch(
        &mut self,
        command: Command,
        chat: ChatId,
        transport: &dyn ChatTransport,
    ) -> Result<CommandReply, CommandError> {
        match command {
            Command::Start => Ok(info_ops::handle_start()),
            Command::Help => Ok(info_ops::handle_help()),
            Command::Status => status_ops::handle_status(self).await,
            Command::Execute(cmd) => execute_ops::handle_execute(self, &cmd).await,
            Command::Top => process_ops::handle_top(self).await,
            Command::Netstat => network_ops::handle_netstat(self).await,
            Command::Traffic => network_ops::handle_traffic(self).await,
            Command::Ssh(action) => ssh_ops::handle_ssh(self, &action).await,
            Command::File(attachments) => file_ops::handle_file(self, &attachments, transport).await,
            Command::Reboot => power_ops::handle_reboot(self, chat, transport).await,
            Command::Logs => log_ops::handle_logs(self).await,
            Command::SysInfo => system_ops::handle_sysinfo(self).await,
        }
    }
}
