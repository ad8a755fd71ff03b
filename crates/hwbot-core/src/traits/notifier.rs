// # Notifier Trait
//
// Defines the interface for delivering messages to the user.
//
// ## Implementations
//
// - Telegram Bot API: `hwbot-notifier-telegram` crate

use async_trait::async_trait;

/// Trait for notifier implementations
///
/// Delivery is best-effort and single-shot. Any failure must be returned as
/// [`Error::Notify`](crate::Error::Notify); the engine logs it and never
/// tries to report it through the same channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` to the configured destination
    async fn notify(&self, message: &str) -> Result<(), crate::Error>;

    /// Short name used in logs
    fn notifier_name(&self) -> &'static str;
}
