//! Configuration types for the homework status bot
//!
//! This module defines all configuration structures used throughout the crate.
//! Values are constructed once at startup and handed to the engine and the
//! adapters; nothing here is process-global.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Environment variable carrying the status source credential
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";

/// Environment variable carrying the messaging transport credential
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";

/// Environment variable carrying the destination chat identifier
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Default homework status endpoint
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Default Telegram Bot API base URL
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Main bot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Required credentials
    pub credentials: Credentials,

    /// Status source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Notifier settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Poll loop settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl BotConfig {
    /// Create a configuration with default settings around the given credentials
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            source: SourceConfig::default(),
            notifier: NotifierConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    ///
    /// Credentials are checked first so a missing token is always the
    /// reported cause.
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.credentials.validate()?;
        self.source.validate()?;
        self.notifier.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// The three values the bot cannot run without
///
/// The Debug implementation intentionally does NOT expose the tokens.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// OAuth token for the status endpoint
    pub practicum_token: String,
    /// Telegram bot token
    pub telegram_token: String,
    /// Telegram chat to deliver notifications to
    pub telegram_chat_id: String,
}

impl Credentials {
    /// Create a new credential set
    pub fn new(
        practicum_token: impl Into<String>,
        telegram_token: impl Into<String>,
        telegram_chat_id: impl Into<String>,
    ) -> Self {
        Self {
            practicum_token: practicum_token.into(),
            telegram_token: telegram_token.into(),
            telegram_chat_id: telegram_chat_id.into(),
        }
    }

    /// Names of the required values that are absent or blank
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (PRACTICUM_TOKEN_VAR, &self.practicum_token),
            (TELEGRAM_TOKEN_VAR, &self.telegram_token),
            (TELEGRAM_CHAT_ID_VAR, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Confirm every required value is present
    ///
    /// Returns a configuration error naming each missing value.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let missing = self.missing();
        if missing.is_empty() {
            return Ok(());
        }

        tracing::error!(
            critical = true,
            missing = ?missing,
            "Required configuration value missing, refusing to start"
        );
        Err(crate::Error::config(format!(
            "missing required value(s): {}",
            missing.join(", ")
        )))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<REDACTED>")
            .field("telegram_token", &"<REDACTED>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

/// Status source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Endpoint to poll
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// HTTP request timeout (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SourceConfig {
    /// Validate the source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_url("status endpoint", &self.endpoint)?;
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Status source timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Telegram Bot API base URL
    #[serde(default = "default_telegram_api")]
    pub api_base: String,

    /// HTTP request timeout (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl NotifierConfig {
    /// Validate the notifier configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_url("Telegram API base", &self.api_base)?;
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Notifier timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which records of a non-empty batch get parsed and reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSelection {
    /// Only the first record of the batch
    #[default]
    First,
    /// Every record, in order
    All,
}

impl std::str::FromStr for RecordSelection {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(RecordSelection::First),
            "all" => Ok(RecordSelection::All),
            other => Err(crate::Error::config(format!(
                "Unknown record selection '{}'. Valid: first, all",
                other
            ))),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fixed delay between cycles (in seconds)
    ///
    /// Every outcome, success or failure, waits exactly this long. There is
    /// no backoff growth.
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,

    /// Records reported per cycle
    #[serde(default)]
    pub record_selection: RecordSelection,

    /// Error kinds whose repeats are withheld until the failure run ends
    #[serde(default = "default_suppressible_kinds")]
    pub suppressible_kinds: HashSet<ErrorKind>,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.retry_interval_secs == 0 {
            return Err(crate::Error::config("Retry interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        if self.suppressible_kinds.contains(&ErrorKind::Notify)
            || self.suppressible_kinds.contains(&ErrorKind::Config)
        {
            return Err(crate::Error::config(
                "Only reportable error kinds can be suppressed",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_interval_secs: default_retry_interval_secs(),
            record_selection: RecordSelection::default(),
            suppressible_kinds: default_suppressible_kinds(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn validate_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{} cannot be empty", what)));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            what, url
        )));
    }
    Ok(())
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_telegram_api() -> String {
    DEFAULT_TELEGRAM_API.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_interval_secs() -> u64 {
    600
}

fn default_suppressible_kinds() -> HashSet<ErrorKind> {
    HashSet::from([ErrorKind::Source])
}

fn default_event_channel_capacity() -> usize {
    1000
}
