//! Status Parser
//!
//! Turns one homework record into the message sent to the user.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::StatusCatalog;
use crate::error::{Error, Result};

/// One homework record as reported by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Homework name
    pub homework_name: String,
    /// Review status code
    pub status: String,
}

/// Parse a raw record into a change message
///
/// Returns `Ok(None)` for an empty record (`null` or `{}`): there is
/// nothing to report.
///
/// # Errors
///
/// - [`Error::Shape`] if the record lacks `homework_name` or `status`
/// - [`Error::UnknownStatus`] if the status is not in the catalog
pub fn parse(catalog: &StatusCatalog, record: &Value) -> Result<Option<String>> {
    let is_empty = match record {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    };
    if is_empty {
        return Ok(None);
    }

    let record: ResourceRecord = serde_json::from_value(record.clone())
        .map_err(|e| Error::shape(format!("invalid homework record: {}", e)))?;

    let verdict = catalog
        .verdict(&record.status)
        .ok_or_else(|| Error::unknown_status(record.status.clone()))?;

    Ok(Some(format!(
        "Changed review status for \"{}\". {}",
        record.homework_name, verdict
    )))
}
