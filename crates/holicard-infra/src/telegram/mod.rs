//! Telegram Bot API transport.
//!
//! [`TelegramClient`] implements [`ChatTransport`] over plain HTTPS calls
//! to `https://api.telegram.org/bot<token>/<method>`. Inbound updates are
//! fetched with long polling, see [`updates`].

pub mod types;
pub mod updates;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use holicard_core::flow::transport::ChatTransport;
use holicard_types::chat::{Keyboard, MessageRef, SessionId};
use holicard_types::error::TransportError;

use self::types::{ApiResponse, InlineKeyboardMarkup, InputMediaPhoto, Message, Update, User};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Longest text a single message may carry.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// A media group holds between 2 and 10 items.
const MAX_MEDIA_GROUP: usize = 10;

/// Seconds the server holds a `getUpdates` call open.
pub const LONG_POLL_SECS: u64 = 30;

/// Does not derive Debug: the token is part of every request URL.
pub struct TelegramClient {
    client: reqwest::Client,
    token: SecretString,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: SecretString) -> Result<Self, TransportError> {
        // The HTTP timeout must outlast the long-poll window.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_SECS + 15))
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the base URL (useful for testing or a local Bot API server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url,
            self.token.expose_secret(),
            method
        )
    }

    /// POST a Bot API method and unwrap the response envelope.
    async fn call<P, T>(&self, method: &str, params: &P) -> Result<T, TransportError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(params)
            .send()
            .await
            // reqwest errors include the URL, and with it the token.
            .map_err(|e| TransportError::Request(e.without_url().to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.without_url().to_string()))?;

        parse_response(method, &body)
    }

    /// Identity of the bot owning the token.
    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", &json!({})).await
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }
}

fn parse_response<T: DeserializeOwned>(method: &str, body: &str) -> Result<T, TransportError> {
    let envelope: ApiResponse<T> = serde_json::from_str(body)
        .map_err(|e| TransportError::Deserialization(format!("{method}: {e}")))?;

    if !envelope.ok {
        let description = envelope
            .description
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(TransportError::Rejected(format!("{method}: {description}")));
    }

    envelope
        .result
        .ok_or_else(|| TransportError::Deserialization(format!("{method}: missing result")))
}

/// Split `text` into chunks no longer than `limit` UTF-16 code units,
/// preferring line breaks as cut points.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len: usize = line.encode_utf16().count();

        if current_len + line_len <= limit {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= limit {
            current.push_str(line);
            current_len = line_len;
            continue;
        }

        // A single line over the limit is cut at char boundaries.
        for ch in line.chars() {
            let ch_len = ch.len_utf16();
            if current_len + ch_len > limit {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(ch);
            current_len += ch_len;
        }
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn is_not_modified(err: &TransportError) -> bool {
    matches!(err, TransportError::Rejected(msg) if msg.contains("message is not modified"))
}

impl ChatTransport for TelegramClient {
    #[tracing::instrument(name = "telegram_send", skip(self, text, keyboard), fields(session = %session))]
    async fn send_text(
        &self,
        session: SessionId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef, TransportError> {
        let chunks = split_message(text, MAX_MESSAGE_LEN);
        let last = chunks.len() - 1;
        let mut sent = None;

        for (i, chunk) in chunks.iter().enumerate() {
            let mut params = json!({ "chat_id": session.0, "text": chunk });
            if let Some(keyboard) = keyboard.filter(|_| i == last) {
                params["reply_markup"] = json!(InlineKeyboardMarkup::from(keyboard));
            }

            let message: Message = self.call("sendMessage", &params).await?;
            sent = Some(MessageRef {
                session,
                message_id: message.message_id,
            });
        }

        sent.ok_or(TransportError::Closed)
    }

    #[tracing::instrument(name = "telegram_photos", skip(self, urls), fields(session = %session, count = urls.len()))]
    async fn send_photos(&self, session: SessionId, urls: &[String]) -> Result<(), TransportError> {
        match urls {
            [] => Ok(()),
            [url] => {
                let _: Message = self
                    .call("sendPhoto", &json!({ "chat_id": session.0, "photo": url }))
                    .await?;
                Ok(())
            }
            _ => {
                let media: Vec<InputMediaPhoto<'_>> = urls
                    .iter()
                    .take(MAX_MEDIA_GROUP)
                    .map(|url| InputMediaPhoto::new(url))
                    .collect();
                let _: Vec<Message> = self
                    .call("sendMediaGroup", &json!({ "chat_id": session.0, "media": media }))
                    .await?;
                Ok(())
            }
        }
    }

    async fn edit_text(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        let mut params = json!({
            "chat_id": message.session.0,
            "message_id": message.message_id,
            "text": text,
        });
        if let Some(keyboard) = keyboard {
            params["reply_markup"] = json!(InlineKeyboardMarkup::from(keyboard));
        }

        // editMessageText returns the edited Message (or `true` for inline messages).
        match self.call::<_, serde_json::Value>("editMessageText", &params).await {
            Ok(_) => Ok(()),
            Err(e) if is_not_modified(&e) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "deleteMessage",
                &json!({ "chat_id": message.session.0, "message_id": message.message_id }),
            )
            .await?;
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_id }),
            )
            .await?;
        Ok(())
    }
}
