//! Poll loop engine
//!
//! The PollEngine is responsible for:
//! - Fetching status changes since the cursor via StatusSource
//! - Validating and parsing the response
//! - Delivering change messages via Notifier
//! - Reporting failures, withholding repeats of suppressible kinds
//! - Advancing the cursor after a completed cycle
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  fetch(cursor)  ┌──────────────┐
//! │ StatusSource │◄────────────────│  PollEngine  │
//! └──────────────┘                 └──────────────┘
//!                                         │
//!         ┌───────────────────────────────┼───────────────────────────┐
//!         │                               │                           │
//!         ▼                               ▼                           ▼
//! ┌───────────────┐               ┌──────────────┐            ┌─────────────┐
//! │ validate/parse│               │   Notifier   │            │   Events    │
//! │ (status)      │               │   (notify)   │            │  (observe)  │
//! └───────────────┘               └──────────────┘            └─────────────┘
//! ```
//!
//! ## Cycle
//!
//! 1. Fetch with the current cursor
//! 2. Validate the response shape and read `current_date`; nothing to send if
//!    there are no records
//! 3. Parse the selected record(s) and notify each message
//! 4. Advance the cursor to the server-reported `current_date`
//! 5. Sleep the fixed interval
//!
//! Any failure ends the cycle early, is classified by [`ErrorKind`] and is
//! followed by the same sleep. Only configuration errors are fatal, and they
//! are raised by [`PollEngine::new`] before any cycle runs.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::config::{BotConfig, RecordSelection};
use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Result};
use crate::status::{self, StatusCatalog};
use crate::suppression::SuppressionState;
use crate::traits::{Notifier, StatusSource};

/// Lifecycle state of the engine
///
/// The fatal path never yields an engine: [`PollEngine::new`] returns
/// [`Error::Config`] instead and the process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, loop not started
    Idle,
    /// Steady state: running cycles
    Cycling,
    /// Stopped after a shutdown signal
    Stopped,
}

/// Result of a single cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The response carried no records
    NoUpdate,
    /// Records were present but none produced a message
    NothingToReport,
    /// Change messages were delivered
    Delivered {
        /// Number of messages sent
        count: usize,
    },
    /// The cycle ended with a classified failure
    Failed {
        /// Failure class
        kind: ErrorKind,
    },
}

/// Events emitted by the PollEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Loop started
    Started {
        cursor: i64,
    },

    /// A cycle finished
    CycleCompleted {
        outcome: CycleOutcome,
    },

    /// A status change message was delivered
    UpdateNotified {
        message: String,
    },

    /// A failure was reported to the user
    ErrorNotified {
        kind: ErrorKind,
        message: String,
    },

    /// A failure was logged but not reported (repeat of a reported run)
    ErrorSuppressed {
        kind: ErrorKind,
    },

    /// The notifier itself failed
    NotifyFailed {
        error: String,
    },

    /// The cursor moved forward
    CursorAdvanced {
        from: i64,
        to: i64,
    },

    /// Loop stopped
    Stopped {
        reason: String,
    },
}

/// Text sent to the user when a cycle fails
pub fn failure_message(error: &Error) -> String {
    match error.kind() {
        ErrorKind::Source => format!("API is unreachable: {}", error),
        ErrorKind::Shape => format!("Unexpected API response: {}", error),
        ErrorKind::UnknownStatus => {
            format!("Undocumented homework status in API response: {}", error)
        }
        ErrorKind::Notify | ErrorKind::Config | ErrorKind::Unexpected => {
            format!("Program failure: {}", error)
        }
    }
}

/// Core poll loop
///
/// Owns the cursor and the suppression state exclusively; one cycle runs to
/// completion before the next begins.
///
/// ## Lifecycle
///
/// 1. Create with [`PollEngine::new()`] (validates configuration)
/// 2. Start with [`PollEngine::run()`]
/// 3. Engine cycles until a shutdown signal is received
pub struct PollEngine {
    /// Where status changes come from
    source: Box<dyn StatusSource>,

    /// Where messages go
    notifier: Box<dyn Notifier>,

    /// Status code → verdict text
    catalog: StatusCatalog,

    /// Lower bound of the next fetch window
    cursor: Cursor,

    /// Which failure runs were already reported
    suppression: SuppressionState,

    /// Records reported per cycle
    record_selection: RecordSelection,

    /// Fixed delay between cycles
    retry_interval: Duration,

    /// Lifecycle state
    state: EngineState,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl PollEngine {
    /// Create a new poll engine
    ///
    /// # Parameters
    ///
    /// - `source`: Status source implementation
    /// - `notifier`: Notifier implementation
    /// - `config`: Bot configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events.
    /// Fails with [`Error::Config`] if a required value is missing.
    pub fn new(
        source: Box<dyn StatusSource>,
        notifier: Box<dyn Notifier>,
        config: BotConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            source,
            notifier,
            catalog: StatusCatalog::new(),
            cursor: Cursor::now(),
            suppression: SuppressionState::new(config.engine.suppressible_kinds),
            record_selection: config.engine.record_selection,
            retry_interval: Duration::from_secs(config.engine.retry_interval_secs),
            state: EngineState::Idle,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Start from an explicit cursor instead of "now"
    pub fn with_initial_cursor(mut self, timestamp: i64) -> Self {
        self.cursor = Cursor::new(timestamp);
        self
    }

    /// Current lower bound of the fetch window
    pub fn cursor(&self) -> i64 {
        self.cursor.get()
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Run the engine
    ///
    /// Cycles until SIGINT/ctrl-c is received.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    pub async fn run(&mut self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the engine until `shutdown_rx` fires (or its sender is dropped)
    ///
    /// With `None` this behaves like [`PollEngine::run()`]. Hosts that
    /// listen for more signals than ctrl-c (e.g. SIGTERM) use this.
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    /// Internal run implementation that accepts an optional shutdown signal
    ///
    /// # Parameters
    ///
    /// - `shutdown_rx`: Optional oneshot receiver to trigger shutdown; ctrl-c when `None`
    async fn run_internal(&mut self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.state = EngineState::Cycling;
        self.emit_event(EngineEvent::Started {
            cursor: self.cursor.get(),
        });
        info!(
            cursor = self.cursor.get(),
            source = self.source.source_name(),
            notifier = self.notifier.notifier_name(),
            interval_secs = self.retry_interval.as_secs(),
            "Poll loop started"
        );

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for shutdown signal: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.retry_interval) => {}

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.state = EngineState::Stopped;
        self.emit_event(EngineEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
        info!(cursor = self.cursor.get(), "Poll loop stopped");

        Ok(())
    }

    /// Run exactly one cycle, without the trailing sleep
    ///
    /// Never fails: every error is classified, reported or logged, and
    /// turned into [`CycleOutcome::Failed`].
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let cursor = self.cursor.get();
        debug!(cursor, "Starting cycle");

        let outcome = match self.poll_once(cursor).await {
            Ok(outcome) => {
                self.suppression.observe(None);
                outcome
            }
            Err(e) => {
                let kind = e.kind();
                self.suppression.observe(Some(kind));
                self.handle_failure(e).await;
                CycleOutcome::Failed { kind }
            }
        };

        self.emit_event(EngineEvent::CycleCompleted { outcome });
        outcome
    }

    /// Fetch, validate, parse, notify, advance
    async fn poll_once(&mut self, cursor: i64) -> Result<CycleOutcome> {
        let response = self.source.fetch(cursor).await?;

        let validated = status::validate(&response)?;
        // Checked before any delivery: a change is only sent with a cursor to move to
        let current_date = status::current_date(&response)?;

        let outcome = if validated.has_update {
            self.report_records(&validated.records).await?
        } else {
            debug!(cursor, "No changes in response");
            CycleOutcome::NoUpdate
        };

        let from = self.cursor.get();
        if self.cursor.advance(current_date) {
            self.emit_event(EngineEvent::CursorAdvanced {
                from,
                to: current_date,
            });
        }

        Ok(outcome)
    }

    /// Parse the selected records and deliver their messages in order
    async fn report_records(&self, records: &[Value]) -> Result<CycleOutcome> {
        let limit = match self.record_selection {
            RecordSelection::First => 1,
            RecordSelection::All => records.len(),
        };
        if records.len() > limit {
            debug!(
                skipped = records.len() - limit,
                "Only the first record of the batch is reported"
            );
        }

        let mut delivered = 0;
        for record in records.iter().take(limit) {
            match status::parse(&self.catalog, record)? {
                Some(message) => {
                    self.notifier.notify(&message).await?;
                    info!("Status update sent: {}", message);
                    self.emit_event(EngineEvent::UpdateNotified { message });
                    delivered += 1;
                }
                None => {
                    debug!("Record carries nothing to report");
                }
            }
        }

        if delivered == 0 {
            Ok(CycleOutcome::NothingToReport)
        } else {
            Ok(CycleOutcome::Delivered { count: delivered })
        }
    }

    /// Log a cycle failure and report it if policy allows
    async fn handle_failure(&mut self, error: Error) {
        let kind = error.kind();

        if kind == ErrorKind::Notify {
            // The channel we would report through is the one that failed
            error!(%kind, "Failed to deliver message: {}", error);
            self.emit_event(EngineEvent::NotifyFailed {
                error: error.to_string(),
            });
            return;
        }

        let message = failure_message(&error);
        error!(%kind, "{}", message);

        if !self.suppression.should_notify(kind) {
            warn!(%kind, "Failure already reported in this run, not notifying again");
            self.emit_event(EngineEvent::ErrorSuppressed { kind });
            return;
        }

        match self.notifier.notify(&message).await {
            Ok(()) => {
                self.suppression.mark_reported(kind);
                info!(%kind, "Failure report sent");
                self.emit_event(EngineEvent::ErrorNotified { kind, message });
            }
            Err(e) => {
                error!(%kind, "Failed to deliver failure report: {}", e);
                self.emit_event(EngineEvent::NotifyFailed {
                    error: e.to_string(),
                });
            }
        }
    }

    /// Emit an engine event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: EngineEvent) {
        // Never block the loop on a slow observer
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
