// src/command_handler/utils/logging.rs
// ============================================
// Command audit logging
// ============================================

use std::time::Duration;
use tracing::{error, info};

use crate::command_handler::{CommandError, CommandReply};
use crate::config::constants::MAX_AUDIT_ARGS_CHARS;
use crate::types::CallerId;
use crate::utils::security::sanitize_log_input;

/// Result code written to the audit line
pub fn result_code(result: &Result<CommandReply, CommandError>) -> &'static str {
    match result {
        Ok(reply) if reply.success => "SUCCESS",
        Ok(_) => "FAILED",
        Err(e) => e.code(),
    }
}

/// Log one handled command for security audit
pub fn log_command(
    caller: CallerId,
    command: &str,
    args: &str,
    result: &Result<CommandReply, CommandError>,
    elapsed: Duration,
) {
    let safe_command = sanitize_log_input(command);
    let safe_args = audit_args(args);
    let code = result_code(result);

    info!(
        "COMMAND: caller={}, cmd=/{}, args={}, result={}, elapsed_ms={}",
        caller,
        safe_command,
        safe_args,
        code,
        elapsed.as_millis()
    );

    if let Err(e) = result {
        if matches!(e, CommandError::Execution(_) | CommandError::Io { .. }) {
            error!(
                "COMMAND_FAILURE: caller={}, cmd=/{}, details={}",
                caller,
                safe_command,
                sanitize_log_input(&e.to_string())
            );
        }
    }
}

fn audit_args(args: &str) -> String {
    let sanitized = sanitize_log_input(args);
    match sanitized.char_indices().nth(MAX_AUDIT_ARGS_CHARS) {
        Some((cut, _)) => format!("{}...", &sanitized[..cut]),
        None => sanitized,
    }
}
