//! Core traits for the homework status bot
//!
//! This module defines the abstract interfaces the engine talks to.
//!
//! - [`StatusSource`]: Fetch homework status changes since a cursor
//! - [`Notifier`]: Deliver a text message to the user

pub mod notifier;
pub mod status_source;

pub use notifier::Notifier;
pub use status_source::StatusSource;
