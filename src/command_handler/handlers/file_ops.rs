// src/command_handler/handlers/file_ops.rs
// ============================================
// Received file handler
// ============================================

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::command_handler::{CommandError, CommandHandler, CommandReply};
use crate::transport::{Attachment, AttachmentKind, ChatTransport};
use crate::utils::file_timestamp;
use crate::utils::security::{escape_html, sanitize_file_name};

/// Destination file name for an attachment received at `timestamp`.
///
/// Documents keep the final component of their original name; photos are
/// named after their stable attachment id.
pub fn destination_name(attachment: &Attachment, timestamp: &str) -> String {
    match &attachment.kind {
        AttachmentKind::Document { file_name } => {
            let name = file_name
                .as_deref()
                .and_then(sanitize_file_name)
                .unwrap_or_else(|| format!("file_{}", safe_id(&attachment.unique_id)));
            format!("{}_{}", timestamp, name)
        }
        AttachmentKind::Photo => {
            format!("{}_photo_{}.jpg", timestamp, safe_id(&attachment.unique_id))
        }
    }
}

/// `name` with the attachment id inserted before the extension
pub fn disambiguated_name(name: &str, unique_id: &str) -> String {
    let id = safe_id(unique_id);
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &name[..dot], id, &name[dot..]),
        _ => format!("{}_{}", name, id),
    }
}

fn safe_id(id: &str) -> String {
    sanitize_file_name(id).unwrap_or_else(|| "unknown".to_string())
}

/// Create `path` and write `bytes`, never replacing an existing file
async fn write_new_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        let _ = fs::remove_file(path).await;
        return Err(e);
    }
    Ok(())
}

/// Download one attachment and save it under `dir`, returning the name used
async fn save_attachment(
    transport: &dyn ChatTransport,
    attachment: &Attachment,
    dir: &Path,
    file_name: &str,
    max_file_size: u64,
) -> Result<String, CommandError> {
    if let Some(size) = attachment.size {
        if size > max_file_size {
            return Err(CommandError::Usage(format!(
                "File too large: {} bytes (max: {} bytes)",
                size, max_file_size
            )));
        }
    }

    let bytes = transport.fetch_attachment(attachment).await?;
    if bytes.len() as u64 > max_file_size {
        return Err(CommandError::Usage(format!(
            "File too large: {} bytes (max: {} bytes)",
            bytes.len(),
            max_file_size
        )));
    }

    let candidates = [
        file_name.to_string(),
        disambiguated_name(file_name, &attachment.unique_id),
    ];
    for candidate in &candidates {
        let destination = dir.join(candidate);
        match write_new_file(&destination, &bytes).await {
            Ok(()) => {
                info!("Saved {} ({} bytes)", destination.display(), bytes.len());
                return Ok(candidate.clone());
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("{} already exists", destination.display());
            }
            Err(e) => {
                return Err(CommandError::io(
                    format!("Failed to write {}", destination.display()),
                    e,
                ))
            }
        }
    }

    Err(CommandError::Usage(format!(
        "A file named {} already exists",
        file_name
    )))
}

/// Handle `/file` with one or more attachments
pub async fn handle_file(
    handler: &CommandHandler,
    attachments: &[Attachment],
    transport: &dyn ChatTransport,
) -> Result<CommandReply, CommandError> {
    if attachments.is_empty() {
        return Err(CommandError::MissingArgument {
            command: "file",
            what: "an attached file",
        });
    }

    let config = handler.config();
    fs::create_dir_all(&config.download_dir).await.map_err(|e| {
        CommandError::io(
            format!("Failed to create {}", config.download_dir.display()),
            e,
        )
    })?;

    let timestamp = file_timestamp();
    let mut saved = Vec::new();
    let mut failed = Vec::new();

    for attachment in attachments {
        let file_name = destination_name(attachment, &timestamp);
        match save_attachment(
            transport,
            attachment,
            &config.download_dir,
            &file_name,
            config.max_file_size,
        )
        .await
        {
            Ok(saved_name) => saved.push(saved_name),
            Err(e) => {
                warn!("Failed to save {}: {}", file_name, e);
                failed.push((file_name, e.to_string()));
            }
        }
    }

    let mut text = String::new();
    if !saved.is_empty() {
        text.push_str("✅ <b>Saved files:</b>");
        for name in &saved {
            text.push_str(&format!("\n• {}", escape_html(name)));
        }
    }
    if !failed.is_empty() {
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str("❌ <b>Failed:</b>");
        for (name, error) in &failed {
            text.push_str(&format!("\n• {}: {}", escape_html(name), escape_html(error)));
        }
    }

    if saved.is_empty() {
        Ok(CommandReply::failure(text))
    } else {
        Ok(CommandReply::html(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(name: Option<&str>) -> Attachment {
        Attachment {
            file_id: "FILE".to_string(),
            unique_id: "AgADuniq".to_string(),
            kind: AttachmentKind::Document {
                file_name: name.map(str::to_string),
            },
            size: Some(10),
        }
    }

    #[test]
    fn test_document_name() {
        assert_eq!(
            destination_name(&document(Some("report.pdf")), "20240101_120000"),
            "20240101_120000_report.pdf"
        );
    }

    #[test]
    fn test_document_name_strips_directories() {
        assert_eq!(
            destination_name(&document(Some("../../etc/passwd")), "20240101_120000"),
            "20240101_120000_passwd"
        );
        assert_eq!(
            destination_name(&document(Some("C:\\Users\\op\\notes.txt")), "20240101_120000"),
            "20240101_120000_notes.txt"
        );
    }

    #[test]
    fn test_document_without_name() {
        assert_eq!(
            destination_name(&document(None), "20240101_120000"),
            "20240101_120000_file_AgADuniq"
        );
        assert_eq!(
            destination_name(&document(Some("..")), "20240101_120000"),
            "20240101_120000_file_AgADuniq"
        );
    }

    #[test]
    fn test_disambiguated_name() {
        assert_eq!(
            disambiguated_name("20240101_120000_notes.txt", "AgAD2"),
            "20240101_120000_notes_AgAD2.txt"
        );
        assert_eq!(
            disambiguated_name("20240101_120000_Makefile", "AgAD2"),
            "20240101_120000_Makefile_AgAD2"
        );
    }

    #[tokio::test]
    async fn test_write_new_file_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kept.txt");
        write_new_file(&path, b"first").await.unwrap();

        let err = write_new_file(&path, b"second").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
    }

    #[test]
    fn test_photo_name() {
        let photo = Attachment {
            file_id: "FILE".to_string(),
            unique_id: "AQADphoto".to_string(),
            kind: AttachmentKind::Photo,
            size: None,
        };
        assert_eq!(
            destination_name(&photo, "20240101_120000"),
            "20240101_120000_photo_AQADphoto.jpg"
        );
    }
}
