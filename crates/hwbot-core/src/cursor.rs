//! Fetch window cursor
//!
//! A Unix timestamp marking the lower bound of the next fetch. It only ever
//! moves forward.

use tracing::{debug, warn};

/// Monotonic timestamp watermark
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(i64);

impl Cursor {
    /// Start a cursor at the given timestamp
    pub fn new(timestamp: i64) -> Self {
        Self(timestamp)
    }

    /// Start a cursor at the current time
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp())
    }

    /// The current timestamp
    pub fn get(&self) -> i64 {
        self.0
    }

    /// Move the cursor to a server-reported timestamp
    ///
    /// A timestamp behind the current value is ignored. Returns `true` if
    /// the cursor moved.
    pub fn advance(&mut self, to: i64) -> bool {
        if to < self.0 {
            warn!(cursor = self.0, reported = to, "Server time is behind cursor, keeping cursor");
            return false;
        }
        if to == self.0 {
            return false;
        }
        debug!(from = self.0, to, "Cursor advanced");
        self.0 = to;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_forward() {
        let mut cursor = Cursor::new(100);
        assert!(cursor.advance(1000));
        assert_eq!(cursor.get(), 1000);
    }

    #[test]
    fn never_moves_back() {
        let mut cursor = Cursor::new(1000);
        assert!(!cursor.advance(999));
        assert_eq!(cursor.get(), 1000);
        assert!(!cursor.advance(1000));
        assert_eq!(cursor.get(), 1000);
    }

    #[test]
    fn now_is_recent() {
        let cursor = Cursor::now();
        assert!(cursor.get() > 1_600_000_000);
    }
}
