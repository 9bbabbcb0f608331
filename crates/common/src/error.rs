//! Error types for uiverify

use std::fmt;

use thiserror::Error;

/// Result type alias using the uiverify Error
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by a probe or a diagnostic collaborator
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// uiverify error types
#[derive(Error, Debug)]
pub enum Error {
    /// Terminal failure raised by `flush()` or at the end of a `verify` batch
    #[error("{0}")]
    AssertionFailed(AssertionFailure),

    #[error("Condition '{condition}' raised an error: {source}")]
    Condition {
        condition: String,
        #[source]
        source: BoxError,
    },

    #[error("Screenshot capture failed while reporting '{condition}': {source}")]
    Screenshot {
        condition: String,
        #[source]
        source: BoxError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for failures derived from predicates evaluating false.
    pub fn is_assertion_failure(&self) -> bool {
        matches!(self, Error::AssertionFailed(_))
    }

    /// Short type name used when recording the error as a test outcome cause.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Error::AssertionFailed(_) => "AssertionFailure",
            Error::Condition { .. } => "ConditionError",
            Error::Screenshot { .. } => "ScreenshotError",
            Error::InvalidConfig(_) => "InvalidConfig",
            Error::Io(_) => "IoError",
            Error::TomlParse(_) | Error::TomlSerialize(_) => "TomlError",
            Error::Json(_) => "JsonError",
        }
    }
}

/// One failed condition recorded by a ledger or a verify batch
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FailureRecord {
    pub condition: String,
    pub diagnostic: String,
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.condition, self.diagnostic)
    }
}

/// Aggregated failure describing every Fail observed since the last flush
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssertionFailure {
    pub failures: Vec<FailureRecord>,
}

impl AssertionFailure {
    pub fn new(failures: Vec<FailureRecord>) -> Self {
        Self { failures }
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} condition(s) failed", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, failure)?;
        }
        Ok(())
    }
}

/// Panic captured while probing a value or evaluating a predicate
#[derive(Debug, Clone, Error)]
#[error("panicked: {message}")]
pub struct ProbePanic {
    pub message: String,
}

impl ProbePanic {
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_failure_lists_every_record() {
        let failure = AssertionFailure::new(vec![
            FailureRecord {
                condition: "title text".into(),
                diagnostic: "expected: is equal to [Home] but found: [Login]".into(),
            },
            FailureRecord {
                condition: "row count".into(),
                diagnostic: "expected: is greater than [0] but found: [0]".into(),
            },
        ]);
        let text = Error::AssertionFailed(failure).to_string();
        assert!(text.starts_with("2 condition(s) failed"));
        assert!(text.contains("1. title text"));
        assert!(text.contains("2. row count"));
    }

    #[test]
    fn test_only_assertion_failures_are_assertion_failures() {
        let err = Error::Condition {
            condition: "title".into(),
            source: "element not found".into(),
        };
        assert!(!err.is_assertion_failure());
        assert!(Error::AssertionFailed(AssertionFailure::new(vec![])).is_assertion_failure());
    }

    #[test]
    fn test_panic_payload_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(ProbePanic::from_payload(payload).message, "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(ProbePanic::from_payload(payload).message, "owned");
    }
}
