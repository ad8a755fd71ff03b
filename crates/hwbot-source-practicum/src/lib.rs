// # Practicum Status Source
//
// This crate provides the HTTP status source for the homework status bot.
//
// ## Architecture
//
// One GET per engine cycle against the homework status endpoint:
//
// ```http
// GET /api/user_api/homework_statuses/?from_date=<cursor>
// Authorization: OAuth <token>
// ```
//
// Every failure is normalized into a `SourceError` with a reason the engine
// can act on. No retry, no backoff, no caching: all of that is owned by
// `PollEngine`.
//
// ## Security Requirements
//
// - The OAuth token NEVER appears in logs or error messages

use async_trait::async_trait;
use hwbot_core::config::{Credentials, SourceConfig};
use hwbot_core::error::{SourceError, SourceErrorReason};
use hwbot_core::traits::StatusSource;
use hwbot_core::{Error, Result};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Query parameter carrying the cursor
const FROM_DATE_PARAM: &str = "from_date";

/// Error body the endpoint returns alongside non-200 statuses
#[derive(Debug, Default, Deserialize)]
struct ServerError {
    code: Option<String>,
    message: Option<String>,
}

/// HTTP status source for the homework status endpoint
pub struct PracticumSource {
    /// Endpoint to poll
    endpoint: String,

    /// OAuth token
    /// ⚠️ NEVER log this value
    token: String,

    /// HTTP client
    client: reqwest::Client,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for PracticumSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticumSource")
            .field("endpoint", &self.endpoint)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl PracticumSource {
    /// Create a new status source
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Status endpoint URL
    /// - `token`: OAuth token for the endpoint
    /// - `timeout`: Per-request timeout
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::config("Status source token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(endpoint, token, client))
    }

    /// Create a status source around an existing HTTP client
    pub fn with_client(endpoint: impl Into<String>, token: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        }
    }

    /// Create a status source from bot configuration
    pub fn from_config(config: &SourceConfig, credentials: &Credentials) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.endpoint.clone(),
            credentials.practicum_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl StatusSource for PracticumSource {
    async fn fetch(&self, cursor: i64) -> Result<Value> {
        let from_date = effective_cursor(cursor, chrono::Utc::now().timestamp());
        tracing::debug!(from_date, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[(FROM_DATE_PARAM, from_date)])
            .send()
            .await
            .map_err(|e| Error::Source(classify_transport(e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let error = classify_status(status, &body);
            tracing::debug!(status = status.as_u16(), reason = %error.reason, "Status endpoint refused request");
            return Err(Error::Source(error));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Source(classify_transport(e)))?;

        // Maintenance pages and proxies answer 200 with non-JSON bodies
        let value: Value = serde_json::from_str(&body).map_err(|e| {
            Error::Source(SourceError::new(
                SourceErrorReason::Transport,
                format!("undecodable body: {}", e),
            ))
        })?;
        Ok(value)
    }

    fn source_name(&self) -> &'static str {
        "practicum"
    }
}

/// Substitute the current time for a cursor that is not a usable timestamp
fn effective_cursor(cursor: i64, now: i64) -> i64 {
    if cursor > 0 {
        return cursor;
    }
    tracing::warn!(cursor, now, "Invalid cursor, falling back to current time");
    now
}

/// Map a reqwest failure to a source error reason
///
/// The URL is stripped from the error text.
fn classify_transport(error: reqwest::Error) -> SourceError {
    let reason = if error.is_timeout() {
        SourceErrorReason::Timeout
    } else if error.is_connect() {
        SourceErrorReason::Connectivity
    } else {
        SourceErrorReason::Transport
    };
    SourceError::new(reason, error.without_url().to_string())
}

/// Map a non-200 response to a source error
fn classify_status(status: StatusCode, body: &str) -> SourceError {
    let server: ServerError = serde_json::from_str(body).unwrap_or_default();

    let mut detail = format!(
        "HTTP {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    if let Some(code) = server.code {
        detail.push_str(&format!("; code={}", code));
    }
    if let Some(message) = server.message {
        detail.push_str(&format!("; message={}", message));
    }

    let reason = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceErrorReason::AuthorizationRejected,
        _ => SourceErrorReason::UnexpectedStatus,
    };
    SourceError::new(reason, detail)
}
