// src/transport/mod.rs
//! Chat transport abstraction.
//!
//! The dispatcher never talks to a chat service directly. It receives
//! [`IncomingMessage`]s and answers through a [`ChatTransport`], which also
//! provides the download primitive used to save attachments.

pub mod telegram;

use async_trait::async_trait;

use crate::types::{CallerId, ChatId};

pub use telegram::TelegramTransport;

/// Error type for transport operations
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Attachment unavailable: {0}")]
    AttachmentUnavailable(String),
}

/// Kind of file attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentKind {
    /// A file sent as a document, with the name given by the sender
    Document { file_name: Option<String> },
    /// A compressed image; carries no name of its own
    Photo,
}

/// File attached to an incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Identifier used to download the file
    pub file_id: String,
    /// Stable identifier, safe to embed in file names
    pub unique_id: String,
    pub kind: AttachmentKind,
    /// Size in bytes when reported by the transport
    pub size: Option<u64>,
}

/// Message delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub caller: CallerId,
    pub chat: ChatId,
    /// Message text, or the caption for messages carrying files
    pub text: String,
    pub attachments: Vec<Attachment>,
}

/// Chat service the agent is driven through
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Wait for the next batch of messages
    async fn receive(&self) -> Result<Vec<IncomingMessage>, TransportError>;

    /// Send an HTML-formatted message
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError>;

    /// Download the content of an attachment
    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, TransportError>;
}
