// src/transport/telegram.rs
//! Telegram Bot API transport.
//!
//! Long-polls `getUpdates`, answers with `sendMessage` in HTML parse mode and
//! downloads attachments through `getFile`. Request URLs embed the bot token,
//! so URLs are stripped from every HTTP error before it leaves this module.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::{Attachment, AttachmentKind, ChatTransport, IncomingMessage, TransportError};
use crate::types::{CallerId, ChatId};

/// Envelope shared by every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, TransportError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TransportError::Api(
                self.description
                    .unwrap_or_else(|| "request was not successful".to_string()),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    from: Option<User>,
    text: Option<String>,
    caption: Option<String>,
    document: Option<Document>,
    photo: Option<Vec<PhotoSize>>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct Document {
    file_id: String,
    file_unique_id: String,
    file_name: Option<String>,
    file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PhotoSize {
    file_id: String,
    file_unique_id: String,
    width: u32,
    height: u32,
    file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RemoteFile {
    file_path: Option<String>,
}

/// Telegram transport over the Bot HTTP API
pub struct TelegramTransport {
    client: reqwest::Client,
    api_base: String,
    file_base: String,
    offset: AtomicI64,
    poll_timeout: Duration,
}

impl TelegramTransport {
    /// Create a new transport for the bot identified by `token`
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, TransportError> {
        // The HTTP timeout must outlive the server-side long poll
        let client = reqwest::Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()
            .map_err(http_error)?;

        let api_url = api_url.trim_end_matches('/');
        Ok(Self {
            client,
            api_base: format!("{}/bot{}", api_url, token),
            file_base: format!("{}/file/bot{}", api_url, token),
            offset: AtomicI64::new(0),
            poll_timeout,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, TransportError> {
        let url = format!("{}/{}", self.api_base, method);
        let response: ApiResponse<T> = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(http_error)?
            .json()
            .await
            .map_err(http_error)?;

        response.into_result()
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn receive(&self) -> Result<Vec<IncomingMessage>, TransportError> {
        let offset = self.offset.load(Ordering::SeqCst);
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                serde_json::json!({
                    "offset": offset,
                    "timeout": self.poll_timeout.as_secs(),
                    "allowed_updates": ["message"],
                }),
            )
            .await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::SeqCst);
        }

        debug!("Received {} update(s)", updates.len());
        Ok(updates.into_iter().filter_map(convert_update).collect())
    }

    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                serde_json::json!({
                    "chat_id": chat.0,
                    "text": text,
                    "parse_mode": "HTML",
                    "disable_web_page_preview": true,
                }),
            )
            .await?;
        Ok(())
    }

    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, TransportError> {
        let remote: RemoteFile = self
            .call("getFile", serde_json::json!({ "file_id": attachment.file_id }))
            .await?;

        let file_path = remote.file_path.ok_or_else(|| {
            TransportError::AttachmentUnavailable(format!(
                "no download path for file {}",
                attachment.unique_id
            ))
        })?;

        let url = format!("{}/{}", self.file_base, file_path);
        let bytes = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(http_error)?
            .error_for_status()
            .map_err(http_error)?
            .bytes()
            .await
            .map_err(http_error)?;

        Ok(bytes.to_vec())
    }
}

fn http_error(e: reqwest::Error) -> TransportError {
    TransportError::Http(e.without_url())
}

fn convert_update(update: Update) -> Option<IncomingMessage> {
    let message = update.message?;

    // Channel posts carry no sender and can't be authorized
    let Some(from) = message.from else {
        warn!("Ignoring update {} without a sender", update.update_id);
        return None;
    };

    let text = message.text.or(message.caption)?;

    let mut attachments = Vec::new();
    if let Some(document) = message.document {
        attachments.push(Attachment {
            file_id: document.file_id,
            unique_id: document.file_unique_id,
            kind: AttachmentKind::Document {
                file_name: document.file_name,
            },
            size: document.file_size,
        });
    }
    if let Some(photo) = message
        .photo
        .and_then(|sizes| sizes.into_iter().max_by_key(|p| u64::from(p.width) * u64::from(p.height)))
    {
        attachments.push(Attachment {
            file_id: photo.file_id,
            unique_id: photo.file_unique_id,
            kind: AttachmentKind::Photo,
            size: photo.file_size,
        });
    }

    Some(IncomingMessage {
        caller: CallerId(from.id),
        chat: ChatId(message.chat.id),
        text,
        attachments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_updates(json: &str) -> Vec<IncomingMessage> {
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        response
            .into_result()
            .unwrap()
            .into_iter()
            .filter_map(convert_update)
            .collect()
    }

    #[test]
    fn test_text_message_conversion() {
        let messages = parse_updates(
            r#"{"ok":true,"result":[{"update_id":10,"message":{
                "message_id":1,"chat":{"id":555,"type":"private"},
                "from":{"id":777,"is_bot":false,"first_name":"Op"},
                "text":"/c uptime"}}]}"#,
        );

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].caller, CallerId(777));
        assert_eq!(messages[0].chat, ChatId(555));
        assert_eq!(messages[0].text, "/c uptime");
        assert!(messages[0].attachments.is_empty());
    }

    #[test]
    fn test_document_caption_conversion() {
        let messages = parse_updates(
            r#"{"ok":true,"result":[{"update_id":11,"message":{
                "message_id":2,"chat":{"id":1},"from":{"id":1},
                "caption":"/file",
                "document":{"file_id":"F1","file_unique_id":"U1","file_name":"backup.tar.gz","file_size":2048}}}]}"#,
        );

        assert_eq!(messages[0].text, "/file");
        assert_eq!(
            messages[0].attachments,
            vec![Attachment {
                file_id: "F1".to_string(),
                unique_id: "U1".to_string(),
                kind: AttachmentKind::Document {
                    file_name: Some("backup.tar.gz".to_string())
                },
                size: Some(2048),
            }]
        );
    }

    #[test]
    fn test_photo_picks_largest_size() {
        let messages = parse_updates(
            r#"{"ok":true,"result":[{"update_id":12,"message":{
                "message_id":3,"chat":{"id":1},"from":{"id":1},"caption":"/file",
                "photo":[
                    {"file_id":"small","file_unique_id":"s","width":90,"height":60},
                    {"file_id":"large","file_unique_id":"l","width":1280,"height":853,"file_size":90000},
                    {"file_id":"medium","file_unique_id":"m","width":320,"height":213}
                ]}}]}"#,
        );

        let attachment = &messages[0].attachments[0];
        assert_eq!(attachment.file_id, "large");
        assert_eq!(attachment.kind, AttachmentKind::Photo);
        assert_eq!(attachment.size, Some(90000));
    }

    #[test]
    fn test_updates_without_text_or_sender_are_skipped() {
        let messages = parse_updates(
            r#"{"ok":true,"result":[
                {"update_id":13,"message":{"message_id":4,"chat":{"id":1},"from":{"id":1}}},
                {"update_id":14,"message":{"message_id":5,"chat":{"id":-100},"text":"/status"}},
                {"update_id":15}
            ]}"#,
        );
        assert!(messages.is_empty());
    }

    #[test]
    fn test_api_error_envelope() {
        let response: ApiResponse<Vec<Update>> =
            serde_json::from_str(r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#)
                .unwrap();
        match response.into_result() {
            Err(TransportError::Api(description)) => assert_eq!(description, "Unauthorized"),
            other => panic!("unexpected result: {:?}", other.map(|u| u.len())),
        }
    }

    #[test]
    fn test_transport_urls() {
        let transport =
            TelegramTransport::new("https://api.telegram.org/", "123:ABC", Duration::from_secs(30))
                .unwrap();
        assert_eq!(transport.api_base, "https://api.telegram.org/bot123:ABC");
        assert_eq!(transport.file_base, "https://api.telegram.org/file/bot123:ABC");
    }
}
