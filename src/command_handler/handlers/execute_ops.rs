// src/command_handler/handlers/execute_ops.rs
// ============================================
// Command execution handler
// ============================================

use tracing::info;

use super::common::format_output_block;
use crate::command_handler::{CommandError, CommandHandler, CommandReply};

/// Handle `/c <command>` through the shell session
pub async fn handle_execute(
    handler: &mut CommandHandler,
    command: &str,
) -> Result<CommandReply, CommandError> {
    info!(
        "Executing shell command in {}",
        handler.session().current_dir().display()
    );

    let max_chars = handler.config().max_output_chars;
    let output = handler.session_mut().run(command).await;

    Ok(CommandReply::html(format_output_block(
        "✅ Command output:",
        &output,
        max_chars,
    )))
}
