//! uiverify Common Library
//!
//! Typed expectations, conditions and the deferred assertion engine used by
//! UI tests, plus the classifier that partitions recorded test outcomes for
//! reporting.

pub mod classifier;
pub mod condition;
pub mod config;
pub mod element;
pub mod error;
pub mod expect;
pub mod expectation;
pub mod ledger;
pub mod locale;
pub mod logging;
pub mod runner;
pub mod temporal;

// Re-export commonly used types
pub use classifier::{
    ClassifiedOutcomes, FailureCause, MethodKind, OutcomeBucket, OutcomeSummary, RecordedOutcome,
    TestStatus,
};
pub use condition::{Condition, Outcome, Verifiable};
pub use config::VerificationConfig;
pub use element::{ElementRef, Inspector, Property, PropertyValue};
pub use error::{AssertionFailure, BoxError, Error, FailureRecord, Result};
pub use expectation::{Expectation, Observed};
pub use ledger::AssertionLedger;
pub use locale::NumberLocale;
pub use runner::{NoScreenshot, Screenshot, VerificationContext};
pub use temporal::{DurationUnit, Granularity, TemporalAdapter};

/// uiverify version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
