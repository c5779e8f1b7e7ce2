// src/command_handler/handlers/system_ops.rs
// ============================================
// System information handler
// ============================================

use super::common::query_metrics;
use crate::command_handler::{CommandError, CommandHandler, CommandReply};
use crate::metrics::HostInfo;
use crate::utils::security::escape_html;

/// Render host identity as chat HTML
pub fn format_host_info(info: &HostInfo) -> String {
    format!(
        "🖥 <b>System information:</b>\n\
         • <b>Hostname:</b> {}\n\
         • <b>OS:</b> {} {}\n\
         • <b>CPU cores:</b> {}",
        escape_html(&info.hostname),
        escape_html(&info.os_name),
        escape_html(&info.os_release),
        info.cpu_cores
    )
}

/// Handle `/sysinfo`
pub async fn handle_sysinfo(handler: &CommandHandler) -> Result<CommandReply, CommandError> {
    let info = query_metrics(handler.metrics(), |metrics| metrics.host_info()).await?;
    Ok(CommandReply::html(format_host_info(&info)))
}
