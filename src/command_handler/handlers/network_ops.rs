// src/command_handler/handlers/network_ops.rs
// ============================================
// Network tool handlers
// ============================================

use super::common::{format_output_block, run_shell};
use crate::command_handler::{CommandError, CommandHandler, CommandReply};

/// Run a host tool and return its raw output, stdout first
async fn run_tool(
    handler: &CommandHandler,
    title: &str,
    command_line: &str,
) -> Result<CommandReply, CommandError> {
    let config = handler.config();
    let output = run_shell(
        &config.shell,
        command_line,
        handler.session().current_dir(),
        config.command_timeout,
    )
    .await?;

    Ok(CommandReply::html(format_output_block(
        title,
        &output.text(),
        config.max_output_chars,
    )))
}

/// Handle `/netstat`
pub async fn handle_netstat(handler: &CommandHandler) -> Result<CommandReply, CommandError> {
    let command_line = handler.config().netstat_command.clone();
    run_tool(handler, "📡 <b>Active connections:</b>", &command_line).await
}

/// Handle `/traffic`
pub async fn handle_traffic(handler: &CommandHandler) -> Result<CommandReply, CommandError> {
    let command_line = handler.config().traffic_command.clone();
    run_tool(handler, "📡 <b>Network traffic:</b>", &command_line).await
}
