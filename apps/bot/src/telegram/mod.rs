//! Telegram Bot API client.
//!
//! Long-polls `getUpdates` and sends plain-text replies. Only the handful of
//! methods the bot needs are wrapped.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

mod types;

pub use types::{Chat, Message, Update, User};
use types::ApiResponse;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
/// Server-side long-poll window for `getUpdates`.
const POLL_TIMEOUT_SECS: u64 = 30;
/// HTTP timeout; must outlast the long-poll window.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
/// Telegram's text limit, counted in UTF-16 code units.
pub const MAX_MESSAGE_UTF16: usize = 4096;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),
}

/// Outbound side of the chat. Handlers reply through this; carried in
/// `AppState` as `Arc<dyn Messenger>`.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;
}

#[derive(Clone)]
pub struct TelegramClient {
    token: String,
    base_url: String,
    client: Client,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient").finish_non_exhaustive()
    }
}

impl TelegramClient {
    pub fn new(token: String) -> Result<Self, TelegramError> {
        Self::with_base_url(token, DEFAULT_API_BASE.to_string())
    }

    /// Client against a non-default Bot API server (self-hosted or a test double).
    pub fn with_base_url(token: String, base_url: String) -> Result<Self, TelegramError> {
        Ok(Self {
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder().timeout(HTTP_TIMEOUT).build()?,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?
            .json::<ApiResponse<T>>()
            .await?;

        if !response.ok {
            return Err(TelegramError::Api(
                response
                    .description
                    .unwrap_or_else(|| format!("{method} returned ok=false")),
            ));
        }

        response
            .result
            .ok_or_else(|| TelegramError::Api(format!("{method} returned no result")))
    }

    /// The bot's own account. Also proves the token is valid.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &json!({})).await
    }

    /// Long-polls for updates with `update_id >= offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        let body = json!({
            "offset": offset,
            "timeout": POLL_TIMEOUT_SECS,
            "allowed_updates": ["message"],
        });
        self.call("getUpdates", &body).await
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    /// Sends `text`, split into several messages if it exceeds the size limit.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        #[derive(Serialize)]
        struct SendMsgReq<'a> {
            chat_id: i64,
            text: &'a str,
        }

        let chunks = split_message(text, MAX_MESSAGE_UTF16);
        if chunks.len() > 1 {
            debug!("Splitting reply to {} into {} messages", chat_id, chunks.len());
        }

        for chunk in &chunks {
            let req = SendMsgReq {
                chat_id,
                text: chunk,
            };
            self.call::<_, serde_json::Value>("sendMessage", &req).await?;
        }
        Ok(())
    }
}

/// Splits `text` into pieces of at most `limit` UTF-16 units, breaking after
/// the last newline in a piece when there is one. Concatenating the pieces
/// gives back `text`.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.encode_utf16().count() > limit {
        let hard = match utf16_boundary(rest, limit) {
            // A single char wider than the limit still has to go somewhere
            0 => rest.chars().next().map_or(rest.len(), char::len_utf8),
            i => i,
        };
        let cut = match rest[..hard].rfind('\n') {
            Some(i) if i > 0 => i + 1,
            _ => hard,
        };
        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

/// Byte index of the first char that would push the UTF-16 length past `limit`.
fn utf16_boundary(text: &str, limit: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.char_indices() {
        units += c.len_utf16();
        if units > limit {
            return i;
        }
    }
    text.len()
}
