// # Status Source Trait
//
// Defines the interface for fetching homework status changes.
//
// ## Implementations
//
// - Practicum HTTP API: `hwbot-source-practicum` crate
//
// ## Usage
//
// ```rust,ignore
// use hwbot_core::StatusSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* StatusSource implementation */;
//
//     let response = source.fetch(1_700_000_000).await?;
//     println!("{}", response["current_date"]);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde_json::Value;

/// Trait for status source implementations
///
/// # Contract
///
/// - `fetch` issues exactly one request per call
/// - Transport and HTTP failures are returned as
///   [`Error::Source`](crate::Error::Source) with a
///   [`SourceErrorReason`](crate::SourceErrorReason); any other error variant
///   is treated by the engine as unexpected
/// - No retry, no sleeping, no caching: scheduling is owned by
///   [`PollEngine`](crate::PollEngine)
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch every status change since `cursor`
    ///
    /// # Parameters
    ///
    /// - `cursor`: Unix timestamp lower bound of the fetch window
    ///
    /// # Returns
    ///
    /// - `Ok(Value)`: The decoded response body
    /// - `Err(Error)`: If the request failed
    async fn fetch(&self, cursor: i64) -> Result<Value, crate::Error>;

    /// Short name used in logs
    fn source_name(&self) -> &'static str;
}
