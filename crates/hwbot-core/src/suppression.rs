// # Notification Suppression
//
// Tracks which suppressible error kinds have already been reported during
// the current run of consecutive failures. A run ends as soon as a cycle
// finishes with any other outcome, success included.

use std::collections::HashSet;

use crate::error::ErrorKind;

/// Per-kind "already reported" state for the poll loop
#[derive(Debug, Clone)]
pub struct SuppressionState {
    /// Kinds whose repeats are withheld
    suppressible: HashSet<ErrorKind>,
    /// Kinds reported during the run in progress
    reported: HashSet<ErrorKind>,
}

impl SuppressionState {
    /// Create a state where only the given kinds are suppressible
    pub fn new(suppressible: HashSet<ErrorKind>) -> Self {
        Self {
            suppressible,
            reported: HashSet::new(),
        }
    }

    /// Record that a cycle ended with `outcome` (`None` for success)
    ///
    /// Any run of a different kind is over after this call.
    pub fn observe(&mut self, outcome: Option<ErrorKind>) {
        self.reported.retain(|kind| Some(*kind) == outcome);
    }

    /// Whether a failure of this kind should be sent outward
    pub fn should_notify(&self, kind: ErrorKind) -> bool {
        !self.suppressible.contains(&kind) || !self.reported.contains(&kind)
    }

    /// Mark a failure of this kind as reported
    ///
    /// Only call after the notification actually went out.
    pub fn mark_reported(&mut self, kind: ErrorKind) {
        if self.suppressible.contains(&kind) {
            self.reported.insert(kind);
        }
    }

    #[cfg(test)]
    /// Whether a run of this kind has already been reported
    pub fn is_reported(&self, kind: ErrorKind) -> bool {
        self.reported.contains(&kind)
    }
}

impl Default for SuppressionState {
    fn default() -> Self {
        Self::new(HashSet::from([ErrorKind::Source]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_failure_reported_repeats_withheld() {
        let mut state = SuppressionState::default();

        state.observe(Some(ErrorKind::Source));
        assert!(state.should_notify(ErrorKind::Source));
        state.mark_reported(ErrorKind::Source);

        for _ in 0..2 {
            state.observe(Some(ErrorKind::Source));
            assert!(!state.should_notify(ErrorKind::Source));
        }
    }

    #[test]
    fn success_resets_run() {
        let mut state = SuppressionState::default();
        state.observe(Some(ErrorKind::Source));
        state.mark_reported(ErrorKind::Source);

        state.observe(None);
        assert!(!state.is_reported(ErrorKind::Source));
        state.observe(Some(ErrorKind::Source));
        assert!(state.should_notify(ErrorKind::Source));
    }

    #[test]
    fn other_kinds_end_run_and_are_never_suppressed() {
        let mut state = SuppressionState::default();
        state.observe(Some(ErrorKind::Source));
        state.mark_reported(ErrorKind::Source);

        state.observe(Some(ErrorKind::Shape));
        assert!(state.should_notify(ErrorKind::Shape));
        state.mark_reported(ErrorKind::Shape);
        assert!(state.should_notify(ErrorKind::Shape));
        assert!(state.should_notify(ErrorKind::Source));
    }

    #[test]
    fn additional_kinds_can_be_suppressed() {
        let mut state =
            SuppressionState::new(HashSet::from([ErrorKind::Source, ErrorKind::Unexpected]));
        state.observe(Some(ErrorKind::Unexpected));
        state.mark_reported(ErrorKind::Unexpected);
        state.observe(Some(ErrorKind::Unexpected));
        assert!(!state.should_notify(ErrorKind::Unexpected));
    }
}
