// # hwbotd - Homework Status Bot Daemon
//
// This is a THIN integration layer: all polling, classification and
// suppression logic lives in hwbot-core.
//
// The hwbotd daemon is responsible for:
// 1. Loading a dotenv file and reading configuration from the environment
// 2. Initializing logging and the runtime
// 3. Building the status source and the notifier
// 4. Running the poll engine until SIGTERM/SIGINT
//
// ## Configuration
//
// ### Required
// - `PRACTICUM_TOKEN`: OAuth token for the homework status endpoint
// - `TELEGRAM_TOKEN`: Telegram bot token
// - `TELEGRAM_CHAT_ID`: Chat that receives the notifications
//
// ### Optional
// - `HWBOT_ENDPOINT`: Status endpoint override
// - `HWBOT_TELEGRAM_API`: Telegram Bot API base override
// - `HWBOT_RETRY_INTERVAL_SECS`: Delay between polls (default 600)
// - `HWBOT_HTTP_TIMEOUT_SECS`: HTTP timeout for both adapters (default 30)
// - `HWBOT_RECORD_SELECTION`: `first` (default) or `all`
// - `HWBOT_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `HWBOT_ENV_FILE`: dotenv file to load (default `.env`)
//
// ## Example
//
// ```bash
// export PRACTICUM_TOKEN=...
// export TELEGRAM_TOKEN=...
// export TELEGRAM_CHAT_ID=123456789
//
// hwbotd
// ```

use anyhow::Result;
use hwbot_core::config::{
    BotConfig, Credentials, PRACTICUM_TOKEN_VAR, TELEGRAM_CHAT_ID_VAR, TELEGRAM_TOKEN_VAR,
};
use hwbot_core::{PollEngine, RecordSelection};
use hwbot_notifier_telegram::TelegramNotifier;
use hwbot_source_practicum::PracticumSource;
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use tokio::sync::oneshot;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum BotExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<BotExitCode> for ExitCode {
    fn from(code: BotExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    bot: BotConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through a variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| lookup(name).unwrap_or_default().trim().to_string();

        let mut bot = BotConfig::new(Credentials::new(
            required(PRACTICUM_TOKEN_VAR),
            required(TELEGRAM_TOKEN_VAR),
            required(TELEGRAM_CHAT_ID_VAR),
        ));

        if let Some(endpoint) = lookup("HWBOT_ENDPOINT") {
            bot.source.endpoint = endpoint;
        }
        if let Some(api_base) = lookup("HWBOT_TELEGRAM_API") {
            bot.notifier.api_base = api_base;
        }
        if let Some(interval) = parse_var::<u64>(&lookup, "HWBOT_RETRY_INTERVAL_SECS")? {
            bot.engine.retry_interval_secs = interval;
        }
        if let Some(timeout) = parse_var::<u64>(&lookup, "HWBOT_HTTP_TIMEOUT_SECS")? {
            bot.source.timeout_secs = timeout;
            bot.notifier.timeout_secs = timeout;
        }
        if let Some(selection) = lookup("HWBOT_RECORD_SELECTION") {
            bot.engine.record_selection = RecordSelection::from_str(&selection)?;
        }

        Ok(Self {
            bot,
            log_level: lookup("HWBOT_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Range checks here are deployment policy; the core validates the rest
    /// (credentials first).
    fn validate(&self) -> Result<()> {
        self.bot.validate()?;

        let interval = self.bot.engine.retry_interval_secs;
        if !(1..=86_400).contains(&interval) {
            anyhow::bail!(
                "HWBOT_RETRY_INTERVAL_SECS must be between 1 and 86400 seconds. Got: {}",
                interval
            );
        }

        let timeout = self.bot.source.timeout_secs;
        if !(1..=300).contains(&timeout) {
            anyhow::bail!(
                "HWBOT_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                timeout
            );
        }

        if self.bot.source.endpoint.starts_with("http://") {
            eprintln!(
                "WARNING: HWBOT_ENDPOINT uses HTTP (not HTTPS). \
                 The OAuth token will be sent in clear text."
            );
        }

        Ok(())
    }
}

/// Parse an optional numeric variable, rejecting garbage instead of defaulting
fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} must be a number. Got: '{}'", name, raw)),
    }
}

/// Map a log level name to a tracing level
fn parse_log_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Load a dotenv file into the process environment
///
/// A missing file is fine; an unreadable or malformed one is not.
fn load_env_file(path: Option<&str>) -> std::result::Result<bool, dotenvy::Error> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|_| true),
        None => dotenvy::dotenv().map(|_| true),
    };
    loaded.or_else(|err| match err {
        dotenvy::Error::Io(_) => Ok(false),
        _ => Err(err),
    })
}

fn main() -> ExitCode {
    let env_file = env::var("HWBOT_ENV_FILE").ok();
    let env_file_loaded = match load_env_file(env_file.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load env file: {}", e);
            return BotExitCode::ConfigError.into();
        }
    };

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return BotExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let Some(log_level) = parse_log_level(&config.log_level) else {
        eprintln!(
            "HWBOT_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            config.log_level
        );
        return BotExitCode::ConfigError.into();
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return BotExitCode::ConfigError.into();
    }

    // Validate configuration (missing tokens are logged by the core)
    if let Err(e) = config.validate() {
        error!("Configuration validation error: {}", e);
        return BotExitCode::ConfigError.into();
    }

    info!(env_file_loaded, "Starting hwbotd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return BotExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config.bot).await {
            error!("Daemon error: {}", e);
            if e.downcast_ref::<hwbot_core::Error>()
                .is_some_and(|e| e.kind() == hwbot_core::ErrorKind::Config)
            {
                BotExitCode::ConfigError
            } else {
                BotExitCode::RuntimeError
            }
        } else {
            BotExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: BotConfig) -> Result<()> {
    let source = PracticumSource::from_config(&config.source, &config.credentials)?;
    let notifier = TelegramNotifier::from_config(&config.notifier, &config.credentials)?;

    info!(endpoint = %config.source.endpoint, "Status source ready");
    info!(
        interval_secs = config.engine.retry_interval_secs,
        selection = ?config.engine.record_selection,
        "Notifier ready"
    );

    let (mut engine, mut events) = PollEngine::new(Box::new(source), Box::new(notifier), config)?;

    // Engine events are only logged here
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "Engine event");
        }
    });

    let shutdown_rx = install_shutdown_handler()?;
    engine.run_with_shutdown(Some(shutdown_rx)).await?;

    info!("Daemon stopped");
    Ok(())
}

/// Forward SIGTERM/SIGINT to the engine's shutdown channel
#[cfg(unix)]
fn install_shutdown_handler() -> Result<oneshot::Receiver<()>> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
        let _ = tx.send(());
    });

    Ok(rx)
}

/// Forward CTRL-C to the engine's shutdown channel
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn install_shutdown_handler() -> Result<oneshot::Receiver<()>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: SIGINT"),
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
        let _ = tx.send(());
    });

    Ok(rx)
}
