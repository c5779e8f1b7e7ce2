// src/command_handler/handlers/ssh_ops.rs
// ============================================
// SSH authorized keys handler
// ============================================
//
// Keys are appended as a single line. Removal drops every line containing
// the key and restores the file's trailing newline state, so an add
// followed by a remove of the same key leaves the file byte-identical.

use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::command_handler::parser::SshAction;
use crate::command_handler::{CommandError, CommandHandler, CommandReply};
use crate::utils::logging::log_security_event;

/// Append `key` as a new line of the authorized keys file
pub async fn add_key(path: &Path, key: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let existing = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e),
    };

    let line = if existing.is_empty() || existing.ends_with(b"\n") {
        format!("{}\n", key)
    } else {
        format!("\n{}", key)
    };

    let mut options = fs::OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Rewrite the file without lines containing `key`, returning how many were dropped
pub async fn remove_key(path: &Path, key: &str) -> std::io::Result<usize> {
    let content = fs::read_to_string(path).await?;
    let (kept, removed) = filter_key_lines(&content, key);
    if removed > 0 {
        fs::write(path, kept).await?;
    }
    Ok(removed)
}

/// Drop every line containing `key`.
///
/// A dropped final line without a newline takes the preceding newline
/// with it, undoing what [`add_key`] inserted.
pub fn filter_key_lines(content: &str, key: &str) -> (String, usize) {
    let mut kept = String::with_capacity(content.len());
    let mut removed = 0;
    let mut dropped_unterminated = false;

    for line in content.split_inclusive('\n') {
        if line.contains(key) {
            removed += 1;
            dropped_unterminated = !line.ends_with('\n');
        } else {
            kept.push_str(line);
            dropped_unterminated = false;
        }
    }

    if dropped_unterminated && kept.ends_with('\n') {
        kept.pop();
    }
    (kept, removed)
}

/// Handle `/ssh add|remove <key>`
pub async fn handle_ssh(
    handler: &CommandHandler,
    action: &SshAction,
) -> Result<CommandReply, CommandError> {
    let path = &handler.config().authorized_keys_path;

    match action {
        SshAction::Add(key) => {
            add_key(path, key).await.map_err(|e| {
                CommandError::io(format!("Failed to update {}", path.display()), e)
            })?;
            info!("SSH key added to {}", path.display());
            log_security_event("SSH_KEY_ADDED", &key_fingerprint(key));
            Ok(CommandReply::html("✅ SSH key added."))
        }
        SshAction::Remove(key) => {
            let removed = remove_key(path, key).await.map_err(|e| {
                CommandError::io(format!("Failed to update {}", path.display()), e)
            })?;
            if removed == 0 {
                return Ok(CommandReply::html("ℹ️ No matching SSH key found."));
            }
            info!("Removed {} SSH key line(s) from {}", removed, path.display());
            log_security_event("SSH_KEY_REMOVED", &key_fingerprint(key));
            Ok(CommandReply::html(format!(
                "✅ SSH key removed ({} line(s)).",
                removed
            )))
        }
    }
}

/// Short identifier for logs; full keys stay out of the log file
fn key_fingerprint(key: &str) -> String {
    let body = key.split_whitespace().nth(1).unwrap_or(key);
    let skip = body.chars().count().saturating_sub(12);
    format!("...{}", body.chars().skip(skip).collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIOperatorKey op@laptop";

    async fn round_trip(initial: &str) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("authorized_keys");
        std::fs::write(&path, initial).unwrap();

        add_key(&path, KEY).await.unwrap();
        let after_add = std::fs::read_to_string(&path).unwrap();
        assert!(after_add.lines().any(|l| l == KEY));

        assert_eq!(remove_key(&path, KEY).await.unwrap(), 1);
        assert_eq!(std::fs::read(&path).unwrap(), initial.as_bytes());
    }

    #[tokio::test]
    async fn test_round_trip_with_trailing_newline() {
        round_trip("ssh-rsa AAAAB3Nza existing@host\n").await;
    }

    #[tokio::test]
    async fn test_round_trip_without_trailing_newline() {
        round_trip("ssh-rsa AAAAB3Nza existing@host").await;
    }

    #[tokio::test]
    async fn test_round_trip_empty_file() {
        round_trip("").await;
    }

    #[tokio::test]
    async fn test_add_creates_file_and_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".ssh").join("authorized_keys");

        add_key(&path, KEY).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), format!("{}\n", KEY));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn test_remove_from_missing_file_fails() {
        let dir = tempdir().unwrap();
        let err = remove_key(&dir.path().join("absent"), KEY).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_filter_key_lines_substring_match() {
        let content = "key-a one\nkey-b two\nkey-a three\n";
        let (kept, removed) = filter_key_lines(content, "key-a");
        assert_eq!(kept, "key-b two\n");
        assert_eq!(removed, 2);

        let (kept, removed) = filter_key_lines(content, "missing");
        assert_eq!(kept, content);
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_key_fingerprint_hides_key() {
        let fp = key_fingerprint(KEY);
        assert_eq!(fp, "...IOperatorKey");
        assert!(!fp.contains("ssh-ed25519"));
    }
}
