//! Deferred failures for one test execution

use tracing::{debug, info};

use crate::error::{AssertionFailure, Error, FailureRecord, Result};

/// Accumulates failed conditions until the owner decides to stop
///
/// A ledger belongs to exactly one test. It is never shared between tests, so
/// it needs no synchronization; a test running on a reused worker must call
/// [`AssertionLedger::reset`] (or `flush`) when it starts.
#[derive(Debug, Default)]
pub struct AssertionLedger {
    pending: Vec<FailureRecord>,
}

impl AssertionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, record: FailureRecord) {
        debug!(condition = %record.condition, "recording deferred failure");
        self.pending.push(record);
    }

    pub fn has_pending_failures(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> &[FailureRecord] {
        &self.pending
    }

    /// Raise one aggregated failure if anything was recorded; always leaves the ledger empty.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let failures = std::mem::take(&mut self.pending);
        info!(failures = failures.len(), "flushing deferred failures");
        Err(Error::AssertionFailed(AssertionFailure::new(failures)))
    }

    /// Drop pending failures without raising.
    pub fn reset(&mut self) {
        if !self.pending.is_empty() {
            debug!(discarded = self.pending.len(), "resetting ledger with pending failures");
        }
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> FailureRecord {
        FailureRecord {
            condition: name.to_string(),
            diagnostic: "expected: is true but found: [false]".to_string(),
        }
    }

    #[test]
    fn test_flush_without_failures_is_noop() {
        let mut ledger = AssertionLedger::new();
        assert!(ledger.flush().is_ok());
        assert!(ledger.flush().is_ok());
    }

    #[test]
    fn test_flush_raises_once_then_resets() {
        let mut ledger = AssertionLedger::new();
        ledger.record_failure(record("a"));
        ledger.record_failure(record("b"));
        assert!(ledger.has_pending_failures());

        match ledger.flush() {
            Err(Error::AssertionFailed(failure)) => assert_eq!(failure.len(), 2),
            other => panic!("expected assertion failure, got {:?}", other),
        }
        assert!(!ledger.has_pending_failures());
        assert!(ledger.flush().is_ok());
    }

    #[test]
    fn test_reset_discards_pending() {
        let mut ledger = AssertionLedger::new();
        ledger.record_failure(record("leftover"));
        ledger.reset();
        assert!(ledger.flush().is_ok());
    }
}
