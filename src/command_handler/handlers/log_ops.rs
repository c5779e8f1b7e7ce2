// src/command_handler/handlers/log_ops.rs
// ============================================
// Log tail handler
// ============================================
//
// The agent log is append-only and never rotated, so only a window at the
// end of the file is read.

use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::common::format_output_block;
use crate::command_handler::{CommandError, CommandHandler, CommandReply};
use crate::config::constants::{LOG_TAIL_WINDOW_BYTES, MAX_LOG_TAIL_WINDOW_BYTES};

/// Last `count` lines of `content`
pub fn tail_lines(content: &str, count: usize) -> Vec<&str> {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].to_vec()
}

/// Read the last `count` lines of the file at `path`.
///
/// Starts with a small window before the end of the file and widens it
/// until enough complete lines are found, the window reaches the start of
/// the file, or it hits the maximum size.
pub async fn read_tail(path: &Path, count: usize) -> std::io::Result<Vec<String>> {
    let mut file = File::open(path).await?;
    let len = file.metadata().await?.len();
    let mut window = LOG_TAIL_WINDOW_BYTES;

    loop {
        let start = len.saturating_sub(window);
        file.seek(SeekFrom::Start(start)).await?;
        let mut buf = Vec::with_capacity((len - start) as usize);
        (&mut file).take(len - start).read_to_end(&mut buf).await?;

        let text = String::from_utf8_lossy(&buf);
        // A window that starts mid-file begins with a partial line
        let body = if start == 0 {
            &text[..]
        } else {
            text.find('\n').map(|i| &text[i + 1..]).unwrap_or("")
        };

        let lines = tail_lines(body, count);
        if lines.len() >= count || start == 0 || window >= MAX_LOG_TAIL_WINDOW_BYTES {
            return Ok(lines.into_iter().map(str::to_string).collect());
        }
        window = (window * 4).min(MAX_LOG_TAIL_WINDOW_BYTES);
    }
}

/// Handle `/logs`
pub async fn handle_logs(handler: &CommandHandler) -> Result<CommandReply, CommandError> {
    let config = handler.config();
    let tail = read_tail(&config.log_file, config.log_tail_lines)
        .await
        .map_err(|e| {
            CommandError::io(
                format!("Failed to read log file {}", config.log_file.display()),
                e,
            )
        })?;

    let body = if tail.is_empty() {
        "(log file is empty)".to_string()
    } else {
        tail.join("\n")
    };

    Ok(CommandReply::html(format_output_block(
        &format!("📜 <b>Last {} log lines:</b>", config.log_tail_lines),
        &body,
        config.max_output_chars,
    )))
}
