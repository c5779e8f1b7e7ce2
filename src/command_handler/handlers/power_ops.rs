// src/command_handler/handlers/power_ops.rs
// ============================================
// Reboot handler
// ============================================

use tracing::{error, warn};

use super::common::run_shell;
use crate::command_handler::{CommandError, CommandHandler, CommandReply};
use crate::transport::ChatTransport;
use crate::types::ChatId;
use crate::utils::logging::log_security_event;

pub const REBOOT_ACK: &str = "🔄 Rebooting the server...";

/// Handle `/reboot`: acknowledge first, the reply may never arrive
pub async fn handle_reboot(
    handler: &CommandHandler,
    chat: ChatId,
    transport: &dyn ChatTransport,
) -> Result<CommandReply, CommandError> {
    if let Err(e) = transport.send_text(chat, REBOOT_ACK).await {
        warn!("Failed to send reboot acknowledgement: {}", e);
    }

    let config = handler.config();
    log_security_event("REBOOT_REQUESTED", &config.reboot_command);

    let output = run_shell(
        &config.shell,
        &config.reboot_command,
        handler.session().current_dir(),
        config.command_timeout,
    )
    .await?;

    if !output.success() {
        error!("Reboot command failed with {:?}", output.exit_code);
        return Err(CommandError::Execution(format!(
            "Reboot command failed: {}",
            output.text().trim()
        )));
    }

    Ok(CommandReply::html("✅ Reboot command issued."))
}
