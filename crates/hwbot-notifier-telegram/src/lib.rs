// # Telegram Notifier
//
// This crate delivers bot messages through the Telegram Bot API.
//
// ## Architectural Constraints
//
// Notifiers are single-shot:
// - ✅ One `sendMessage` call per `notify()`
// - ✅ Every failure returned as `Error::Notify`
// - ❌ NO retry logic (the engine decides what happens next)
// - ❌ NO background tasks
//
// ## Security Requirements
//
// - The bot token is part of the request URL; it NEVER appears in logs or
//   error messages (reqwest errors are stripped of their URL)
//
// ## API Reference
//
// - Send message: POST `/bot<token>/sendMessage` with `{ "chat_id", "text" }`

use async_trait::async_trait;
use hwbot_core::config::{Credentials, NotifierConfig};
use hwbot_core::traits::Notifier;
use hwbot_core::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Request body of `sendMessage`
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram Bot API notifier
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the bot token.
pub struct TelegramNotifier {
    /// Bot API base URL
    api_base: String,

    /// Bot token
    /// ⚠️ NEVER log this value
    token: String,

    /// Destination chat
    chat_id: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the bot token
impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base)
            .field("token", &"<REDACTED>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramNotifier {
    /// Create a new Telegram notifier
    ///
    /// # Parameters
    ///
    /// - `api_base`: Bot API base URL (e.g. `https://api.telegram.org`)
    /// - `token`: Bot token
    /// - `chat_id`: Destination chat identifier
    /// - `timeout`: Per-request timeout
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(api_base, token, chat_id, client)
    }

    /// Create a notifier around an existing HTTP client
    pub fn with_client(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        client: reqwest::Client,
    ) -> Result<Self> {
        let token = token.into();
        let chat_id = chat_id.into();
        if token.is_empty() {
            return Err(Error::config("Telegram bot token cannot be empty"));
        }
        if chat_id.is_empty() {
            return Err(Error::config("Telegram chat id cannot be empty"));
        }

        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            chat_id,
            client,
        })
    }

    /// Create a notifier from bot configuration
    pub fn from_config(config: &NotifierConfig, credentials: &Credentials) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.api_base.clone(),
            credentials.telegram_token.clone(),
            credentials.telegram_chat_id.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// URL of the `sendMessage` method
    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: message,
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::notify(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::notify(format!("Failed to parse response: {}", e.without_url())))?;

        check_reply(status, &body)?;

        tracing::info!(chat_id = %self.chat_id, "Message sent to Telegram");
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "telegram"
    }
}

/// Turn a Bot API reply into success or a notify error
fn check_reply(status: reqwest::StatusCode, body: &Value) -> Result<()> {
    if status.is_success() && body["ok"].as_bool() == Some(true) {
        return Ok(());
    }

    let description = body["description"]
        .as_str()
        .unwrap_or("no description");

    Err(match status.as_u16() {
        401 => Error::notify(format!("Bot token rejected. Status: {}", status)),
        400 | 403 => Error::notify(format!("Chat refused the message: {} - {}", status, description)),
        429 => Error::notify(format!("Rate limit exceeded: {} - {}", status, description)),
        _ => Error::notify(format!("sendMessage failed: {} - {}", status, description)),
    })
}
