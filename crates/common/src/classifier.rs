//! Partition recorded test outcomes for reporting
//!
//! A failed test lands in `failed` only when an assertion caused it. Any other
//! cause (timeouts, missing elements, I/O) lands in `stopped`, so report
//! consumers can triage regressions separately from environment flakiness.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Whether the outcome belongs to a test method or a setup/teardown method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    Test,
    Configuration,
}

/// Terminal status reported by the surrounding test runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    /// Skipped because the attempt is being retried
    Retried,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CauseKind {
    Assertion,
    Exception,
}

/// The error that ended a test attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCause {
    pub kind: CauseKind,
    pub type_name: String,
    pub message: String,
}

impl FailureCause {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self {
            kind: CauseKind::Assertion,
            type_name: "AssertionFailure".to_string(),
            message: message.into(),
        }
    }

    pub fn exception(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: CauseKind::Exception,
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn from_error(err: &Error) -> Self {
        if err.is_assertion_failure() {
            Self::assertion(err.to_string())
        } else {
            Self::exception(err.kind_name(), err.to_string())
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

/// One recorded attempt of one test or configuration method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedOutcome {
    pub class_name: String,
    pub method_name: String,
    #[serde(default)]
    pub kind: MethodKind,
    pub status: TestStatus,
    #[serde(default)]
    pub cause: Option<FailureCause>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl RecordedOutcome {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        status: TestStatus,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            kind: MethodKind::Test,
            status,
            cause: None,
            duration_ms: 0,
            started_at: None,
        }
    }

    pub fn passed(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self::new(class_name, method_name, TestStatus::Passed)
    }

    pub fn failed(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        cause: FailureCause,
    ) -> Self {
        Self::new(class_name, method_name, TestStatus::Failed).with_cause(cause)
    }

    pub fn with_cause(mut self, cause: FailureCause) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn with_kind(mut self, kind: MethodKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_timing(mut self, started_at: DateTime<Utc>, duration_ms: u64) -> Self {
        self.started_at = Some(started_at);
        self.duration_ms = duration_ms;
        self
    }

    /// Bucket this outcome belongs in; `None` for configuration methods that did not fail.
    pub fn bucket(&self) -> Option<OutcomeBucket> {
        match (self.kind, self.status) {
            (MethodKind::Configuration, TestStatus::Failed) => {
                Some(OutcomeBucket::FailedConfiguration)
            }
            (MethodKind::Configuration, _) => None,
            (MethodKind::Test, TestStatus::Passed) => Some(OutcomeBucket::Passed),
            (MethodKind::Test, TestStatus::Failed) => match &self.cause {
                Some(cause) if cause.kind == CauseKind::Exception => Some(OutcomeBucket::Stopped),
                _ => Some(OutcomeBucket::Failed),
            },
            (MethodKind::Test, TestStatus::Skipped) => Some(OutcomeBucket::Skipped),
            (MethodKind::Test, TestStatus::Retried) => Some(OutcomeBucket::Retried),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeBucket {
    Passed,
    FailedConfiguration,
    Failed,
    Stopped,
    Skipped,
    Retried,
}

impl OutcomeBucket {
    pub const ALL: [OutcomeBucket; 6] = [
        OutcomeBucket::Passed,
        OutcomeBucket::FailedConfiguration,
        OutcomeBucket::Failed,
        OutcomeBucket::Stopped,
        OutcomeBucket::Skipped,
        OutcomeBucket::Retried,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OutcomeBucket::Passed => "passed",
            OutcomeBucket::FailedConfiguration => "failed configuration",
            OutcomeBucket::Failed => "failed",
            OutcomeBucket::Stopped => "stopped",
            OutcomeBucket::Skipped => "skipped",
            OutcomeBucket::Retried => "retried",
        }
    }
}

impl fmt::Display for OutcomeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcomes grouped by class name, then method name, both sorted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeGroup {
    classes: BTreeMap<String, BTreeMap<String, Vec<RecordedOutcome>>>,
}

impl OutcomeGroup {
    fn insert(&mut self, outcome: RecordedOutcome) {
        self.classes
            .entry(outcome.class_name.clone())
            .or_default()
            .entry(outcome.method_name.clone())
            .or_default()
            .push(outcome);
    }

    pub fn len(&self) -> usize {
        self.classes
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn methods(&self, class_name: &str) -> Option<&BTreeMap<String, Vec<RecordedOutcome>>> {
        self.classes.get(class_name)
    }

    /// All outcomes in (class, method, recording) order.
    pub fn iter(&self) -> impl Iterator<Item = &RecordedOutcome> {
        self.classes
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(|outcomes| outcomes.iter())
    }
}

/// Count of outcomes per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub passed: usize,
    pub failed_configuration: usize,
    pub failed: usize,
    pub stopped: usize,
    pub skipped: usize,
    pub retried: usize,
}

impl OutcomeSummary {
    pub fn total(&self) -> usize {
        self.passed
            + self.failed_configuration
            + self.failed
            + self.stopped
            + self.skipped
            + self.retried
    }

    /// Failures that should fail a run; retried attempts do not count.
    pub fn has_failures(&self) -> bool {
        self.failed_configuration + self.failed + self.stopped > 0
    }
}

/// The six buckets produced for one test-run scope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedOutcomes {
    pub passed: OutcomeGroup,
    pub failed_configuration: OutcomeGroup,
    pub failed: OutcomeGroup,
    pub stopped: OutcomeGroup,
    pub skipped: OutcomeGroup,
    pub retried: OutcomeGroup,
}

impl ClassifiedOutcomes {
    pub fn classify<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = RecordedOutcome>,
    {
        let mut classified = Self::default();
        for outcome in outcomes {
            if let Some(bucket) = outcome.bucket() {
                classified.bucket_mut(bucket).insert(outcome);
            }
        }
        classified
    }

    pub fn bucket(&self, bucket: OutcomeBucket) -> &OutcomeGroup {
        match bucket {
            OutcomeBucket::Passed => &self.passed,
            OutcomeBucket::FailedConfiguration => &self.failed_configuration,
            OutcomeBucket::Failed => &self.failed,
            OutcomeBucket::Stopped => &self.stopped,
            OutcomeBucket::Skipped => &self.skipped,
            OutcomeBucket::Retried => &self.retried,
        }
    }

    fn bucket_mut(&mut self, bucket: OutcomeBucket) -> &mut OutcomeGroup {
        match bucket {
            OutcomeBucket::Passed => &mut self.passed,
            OutcomeBucket::FailedConfiguration => &mut self.failed_configuration,
            OutcomeBucket::Failed => &mut self.failed,
            OutcomeBucket::Stopped => &mut self.stopped,
            OutcomeBucket::Skipped => &mut self.skipped,
            OutcomeBucket::Retried => &mut self.retried,
        }
    }

    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            passed: self.passed.len(),
            failed_configuration: self.failed_configuration.len(),
            failed: self.failed.len(),
            stopped: self.stopped.len(),
            skipped: self.skipped.len(),
            retried: self.retried.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_and_exception_failures_are_separated() {
        let classified = ClassifiedOutcomes::classify(vec![
            RecordedOutcome::failed("Checkout", "a", FailureCause::assertion("total mismatch")),
            RecordedOutcome::failed(
                "Checkout",
                "b",
                FailureCause::exception("NullPointerException", "cart was null"),
            ),
            RecordedOutcome::passed("Checkout", "c"),
        ]);

        assert_eq!(classified.failed.iter().next().unwrap().method_name, "a");
        assert_eq!(classified.stopped.iter().next().unwrap().method_name, "b");
        assert_eq!(classified.passed.iter().next().unwrap().method_name, "c");
        assert_eq!(classified.summary().total(), 3);
    }

    #[test]
    fn test_grouping_sorts_by_class_then_method() {
        let classified = ClassifiedOutcomes::classify(vec![
            RecordedOutcome::passed("Zeta", "b"),
            RecordedOutcome::passed("Alpha", "z"),
            RecordedOutcome::passed("Alpha", "a"),
            RecordedOutcome::passed("Zeta", "a"),
        ]);
        let order: Vec<(String, String)> = classified
            .passed
            .iter()
            .map(|o| (o.class_name.clone(), o.method_name.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Alpha".to_string(), "a".to_string()),
                ("Alpha".to_string(), "z".to_string()),
                ("Zeta".to_string(), "a".to_string()),
                ("Zeta".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_repeated_method_keeps_recording_order() {
        let first = RecordedOutcome::new("Login", "flaky", TestStatus::Retried).with_timing(
            DateTime::parse_from_rfc3339("2015-08-06T10:00:00Z").unwrap().with_timezone(&Utc),
            10,
        );
        let second = RecordedOutcome::new("Login", "flaky", TestStatus::Retried).with_timing(
            DateTime::parse_from_rfc3339("2015-08-06T10:00:05Z").unwrap().with_timezone(&Utc),
            20,
        );
        let classified = ClassifiedOutcomes::classify(vec![first.clone(), second.clone()]);
        let attempts = &classified.retried.methods("Login").unwrap()["flaky"];
        assert_eq!(attempts, &vec![first, second]);
    }

    #[test]
    fn test_configuration_outcomes() {
        let classified = ClassifiedOutcomes::classify(vec![
            RecordedOutcome::failed("Suite", "setUp", FailureCause::exception("IoError", "disk"))
                .with_kind(MethodKind::Configuration),
            RecordedOutcome::passed("Suite", "tearDown").with_kind(MethodKind::Configuration),
            RecordedOutcome::new("Suite", "ignored", TestStatus::Skipped),
        ]);
        let summary = classified.summary();
        assert_eq!(summary.failed_configuration, 1);
        assert_eq!(summary.passed, 0);
        assert_eq!(summary.skipped, 1);
        assert!(summary.has_failures());
    }

    #[test]
    fn test_from_error_maps_kinds() {
        let assertion = Error::AssertionFailed(crate::error::AssertionFailure::new(vec![]));
        assert_eq!(FailureCause::from_error(&assertion).kind, CauseKind::Assertion);
        let other = Error::InvalidConfig("bad".into());
        let cause = FailureCause::from_error(&other);
        assert_eq!(cause.kind, CauseKind::Exception);
        assert_eq!(cause.type_name, "InvalidConfig");
    }
}
