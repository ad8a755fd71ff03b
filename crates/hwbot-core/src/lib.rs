// # hwbot-core
//
// Core library for the homework status bot.
//
// ## Architecture Overview
//
// This library provides the polling/notification control loop:
// - **StatusSource**: Trait for fetching homework status changes
// - **Notifier**: Trait for delivering messages to the user
// - **status**: Response validation, status parsing and the status catalog
// - **PollEngine**: Core engine that sequences fetch → validate → parse → notify
//   and owns the retry/suppression policy
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP adapters
// 2. **Explicit Configuration**: Credentials and settings are passed in, never global
// 3. **Self-Healing**: Every per-cycle failure is classified and looped; only
//    configuration errors are fatal
// 4. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod status;
pub mod suppression;
pub mod traits;

// Re-export core types for convenience
pub use config::{BotConfig, Credentials, EngineConfig, NotifierConfig, RecordSelection, SourceConfig};
pub use engine::{CycleOutcome, EngineEvent, EngineState, PollEngine};
pub use error::{Error, ErrorKind, Result, SourceError, SourceErrorReason};
pub use status::StatusCatalog;
pub use traits::{Notifier, StatusSource};
