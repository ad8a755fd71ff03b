//! Interpretation of status endpoint payloads
//!
//! - [`validate`]: check the response shape and extract the homework records
//! - [`parse`]: turn one record into a human-readable change message
//! - [`StatusCatalog`]: known status codes and their verdict text

pub mod catalog;
pub mod parser;
pub mod validator;

pub use catalog::StatusCatalog;
pub use parser::{ResourceRecord, parse};
pub use validator::{Validated, current_date, validate};
