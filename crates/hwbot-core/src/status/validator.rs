//! Response Validator
//!
//! Checks the shape of a raw status payload and extracts its homework
//! records. An absent, `null` or empty `homeworks` field is not an error:
//! it simply means nothing changed in the requested window.

use serde_json::Value;

use crate::error::{Error, Result};

/// Field carrying the changed homework records
pub const HOMEWORKS_FIELD: &str = "homeworks";

/// Field carrying the server time to use as the next cursor
pub const CURRENT_DATE_FIELD: &str = "current_date";

/// Outcome of validating one response
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    /// Whether the response carries at least one record
    pub has_update: bool,
    /// The raw records, in server order
    pub records: Vec<Value>,
}

impl Validated {
    fn no_update() -> Self {
        Self {
            has_update: false,
            records: Vec::new(),
        }
    }
}

/// Validate a raw response and extract its records
///
/// # Errors
///
/// Returns [`Error::Shape`] if the payload is not a JSON object or if
/// `homeworks` is present but not an array.
pub fn validate(raw: &Value) -> Result<Validated> {
    let object = raw
        .as_object()
        .ok_or_else(|| Error::shape(format!("response is not a JSON object: {}", kind_of(raw))))?;

    match object.get(HOMEWORKS_FIELD) {
        None | Some(Value::Null) => Ok(Validated::no_update()),
        Some(Value::Array(records)) if records.is_empty() => Ok(Validated::no_update()),
        Some(Value::Array(records)) => Ok(Validated {
            has_update: true,
            records: records.clone(),
        }),
        Some(other) => Err(Error::shape(format!(
            "'{}' must be an array, got {}",
            HOMEWORKS_FIELD,
            kind_of(other)
        ))),
    }
}

/// Extract the server-reported `current_date` from a successful response
///
/// # Errors
///
/// Returns [`Error::Shape`] if the field is missing or not an integer.
pub fn current_date(raw: &Value) -> Result<i64> {
    match raw.get(CURRENT_DATE_FIELD) {
        Some(value) => value.as_i64().ok_or_else(|| {
            Error::shape(format!(
                "'{}' must be an integer, got {}",
                CURRENT_DATE_FIELD,
                kind_of(value)
            ))
        }),
        None => Err(Error::shape(format!("'{}' is missing", CURRENT_DATE_FIELD))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_homeworks_is_no_update() {
        let validated = validate(&json!({"homeworks": [], "current_date": 10})).unwrap();
        assert!(!validated.has_update);
        assert!(validated.records.is_empty());
    }

    #[test]
    fn absent_homeworks_is_no_update() {
        let validated = validate(&json!({"current_date": 10})).unwrap();
        assert_eq!(validated, Validated::no_update());

        let validated = validate(&json!({"homeworks": null})).unwrap();
        assert!(!validated.has_update);
    }

    #[test]
    fn non_array_homeworks_is_shape_error() {
        for bad in [json!({"homeworks": {}}), json!({"homeworks": "x"}), json!({"homeworks": 3})] {
            let err = validate(&bad).unwrap_err();
            assert!(matches!(err, Error::Shape(_)), "{bad} should be rejected");
        }
    }

    #[test]
    fn non_object_response_is_shape_error() {
        let err = validate(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn records_kept_in_order() {
        let validated = validate(&json!({
            "homeworks": [
                {"homework_name": "a", "status": "approved"},
                {"homework_name": "b", "status": "rejected"}
            ]
        }))
        .unwrap();
        assert!(validated.has_update);
        assert_eq!(validated.records.len(), 2);
        assert_eq!(validated.records[1]["homework_name"], "b");
    }

    #[test]
    fn current_date_extraction() {
        assert_eq!(current_date(&json!({"current_date": 1000})).unwrap(), 1000);
        assert!(matches!(current_date(&json!({})), Err(Error::Shape(_))));
        assert!(matches!(
            current_date(&json!({"current_date": "soon"})),
            Err(Error::Shape(_))
        ));
    }
}
