//! Conditions: a named probe bound to an expectation
//!
//! A condition is built fresh for one validation call and evaluated exactly
//! once (evaluation consumes it). The Fail/Error split is decided here and
//! nowhere else: a predicate evaluating false is a [`Outcome::Fail`]; a probe
//! error or a panic while probing or matching is an [`Outcome::Error`].

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{BoxError, ProbePanic};
use crate::expectation::{Expectation, Observed};
use crate::locale::NumberLocale;
use crate::temporal::TemporalAdapter;

/// Result of evaluating one condition
#[derive(Debug)]
pub enum Outcome {
    Pass,
    /// Predicate evaluated false; carries the diagnostic text
    Fail(String),
    /// Probing or matching raised an error
    Error(BoxError),
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => f.write_str("pass"),
            Outcome::Fail(diagnostic) => write!(f, "fail: {}", diagnostic),
            Outcome::Error(err) => write!(f, "error: {}", err),
        }
    }
}

/// Type-erased condition, so one batch can mix value types
pub trait Verifiable: Send {
    fn description(&self) -> &str;

    fn evaluate(self: Box<Self>, locale: &NumberLocale) -> Outcome;
}

type Probe<T> = Box<dyn FnOnce() -> Result<T, BoxError> + Send>;
type Judge<T> = Box<dyn Fn(&T, &NumberLocale) -> Option<String> + Send>;

/// A probe for the actual value plus the judgement applied to it
pub struct Condition<T> {
    description: String,
    probe: Probe<T>,
    judge: Judge<T>,
}

impl<T: 'static> Condition<T> {
    /// Bind `probe` to `expectation`. Diagnostics embed the observed value.
    pub fn new<P, E>(description: impl Into<String>, probe: P, expectation: Expectation<T>) -> Self
    where
        P: FnOnce() -> Result<T, E> + Send + 'static,
        E: Into<BoxError>,
        T: Observed,
    {
        Self {
            description: description.into(),
            probe: Box::new(move || -> Result<T, BoxError> { probe().map_err(Into::into) }),
            judge: Box::new(move |value: &T, locale: &NumberLocale| {
                if expectation.matches(value) {
                    None
                } else {
                    Some(format!(
                        "expected: {} but found: [{}]",
                        expectation.describe_with(locale),
                        value.observed(locale)
                    ))
                }
            }),
        }
    }

    /// Condition over an already-known value.
    pub fn value(description: impl Into<String>, value: T, expectation: Expectation<T>) -> Self
    where
        T: Observed + Send,
    {
        Self::new(description, move || Ok::<T, BoxError>(value), expectation)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn evaluate(self, locale: &NumberLocale) -> Outcome {
        let Condition { probe, judge, .. } = self;
        let result = panic::catch_unwind(AssertUnwindSafe(move || {
            probe().map(|value| judge(&value, locale))
        }));
        match result {
            Ok(Ok(None)) => Outcome::Pass,
            Ok(Ok(Some(diagnostic))) => Outcome::Fail(diagnostic),
            Ok(Err(err)) => Outcome::Error(err),
            Err(payload) => Outcome::Error(Box::new(ProbePanic::from_payload(payload))),
        }
    }

    pub fn boxed(self) -> Box<dyn Verifiable> {
        Box::new(self)
    }
}

impl<U: Observed + 'static> Condition<Vec<U>> {
    /// Condition over every matched instance; the diagnostic tags each mismatching index.
    ///
    /// An empty collection fails: there is nothing that satisfies the expectation.
    pub fn each<P, E>(description: impl Into<String>, probe: P, expectation: Expectation<U>) -> Self
    where
        P: FnOnce() -> Result<Vec<U>, E> + Send + 'static,
        E: Into<BoxError>,
    {
        Self {
            description: description.into(),
            probe: Box::new(move || -> Result<Vec<U>, BoxError> { probe().map_err(Into::into) }),
            judge: Box::new(move |values: &Vec<U>, locale: &NumberLocale| {
                let expected = expectation.describe_with(locale);
                if values.is_empty() {
                    return Some(format!(
                        "expected each instance: {} but no instances were found",
                        expected
                    ));
                }
                let mismatches: Vec<String> = values
                    .iter()
                    .enumerate()
                    .filter(|(_, value)| !expectation.matches(value))
                    .map(|(index, value)| format!("[{}] found: [{}]", index, value.observed(locale)))
                    .collect();
                if mismatches.is_empty() {
                    None
                } else {
                    Some(format!(
                        "expected each instance: {} but {} of {} did not match: {}",
                        expected,
                        mismatches.len(),
                        values.len(),
                        mismatches.join("; ")
                    ))
                }
            }),
        }
    }
}

impl<T: TemporalAdapter + Observed> Condition<T> {
    /// Probe raw text and convert it with `pattern` before matching.
    ///
    /// Text that does not parse is an error, not a failed expectation.
    pub fn parsed<P, E>(
        description: impl Into<String>,
        probe: P,
        pattern: impl Into<String>,
        expectation: Expectation<T>,
    ) -> Self
    where
        P: FnOnce() -> Result<String, E> + Send + 'static,
        E: Into<BoxError>,
    {
        let pattern = pattern.into();
        Self::new(
            description,
            move || -> Result<T, BoxError> {
                let raw = probe().map_err(Into::<BoxError>::into)?;
                T::convert(&raw, &pattern).map_err(|err| {
                    format!("cannot parse [{}] with pattern [{}]: {}", raw, pattern, err).into()
                })
            },
            expectation,
        )
    }
}

impl<T: 'static> Verifiable for Condition<T> {
    fn description(&self) -> &str {
        &self.description
    }

    fn evaluate(self: Box<Self>, locale: &NumberLocale) -> Outcome {
        Condition::evaluate(*self, locale)
    }
}

impl<T> fmt::Debug for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expect;
    use chrono::NaiveDate;
    use std::io;

    fn en() -> NumberLocale {
        NumberLocale::en_us()
    }

    #[test]
    fn test_matching_value_passes() {
        let outcome = Condition::value("answer", 5, expect::is_equal_to(5)).evaluate(&en());
        assert!(outcome.is_pass());
    }

    #[test]
    fn test_fail_embeds_observed_value() {
        let outcome = Condition::value("rows", 1200, expect::is_greater_than(5000)).evaluate(&en());
        match outcome {
            Outcome::Fail(diag) => {
                assert_eq!(diag, "expected: is greater than [5,000] but found: [1,200]");
            }
            other => panic!("expected fail, got {}", other),
        }
    }

    #[test]
    fn test_probe_error_is_error_not_fail() {
        let condition = Condition::new(
            "title",
            || Err::<String, _>(io::Error::new(io::ErrorKind::NotFound, "element not found")),
            expect::equals("Home"),
        );
        let outcome = condition.evaluate(&en());
        assert!(outcome.is_error());
        assert!(outcome.to_string().contains("element not found"));
    }

    #[test]
    fn test_panic_in_predicate_is_error() {
        let exploding = Expectation::<i32>::described(|_| panic!("predicate exploded"), "explodes");
        let outcome = Condition::value("boom", 1, exploding).evaluate(&en());
        match outcome {
            Outcome::Error(err) => assert!(err.to_string().contains("predicate exploded")),
            other => panic!("expected error, got {}", other),
        }
    }

    #[test]
    fn test_each_tags_mismatching_indices() {
        let condition = Condition::each(
            "row labels",
            || Ok::<_, BoxError>(vec!["ok".to_string(), "bad".to_string(), "ok".to_string(), "worse".to_string()]),
            expect::equals::<String>("ok"),
        );
        match condition.evaluate(&en()) {
            Outcome::Fail(diag) => {
                assert!(diag.contains("2 of 4 did not match"));
                assert!(diag.contains("[1] found: [bad]"));
                assert!(diag.contains("[3] found: [worse]"));
                assert!(!diag.contains("[0]"));
            }
            other => panic!("expected fail, got {}", other),
        }
    }

    #[test]
    fn test_each_on_empty_collection_fails() {
        let condition = Condition::each(
            "rows",
            || Ok::<Vec<bool>, BoxError>(Vec::new()),
            expect::is_true(),
        );
        assert!(condition.evaluate(&en()).is_fail());
    }

    #[test]
    fn test_parsed_temporal_condition() {
        use crate::temporal::{self, DurationUnit};
        let reference = NaiveDate::from_ymd_opt(2015, 8, 6).unwrap();
        let ok = Condition::parsed(
            "due date",
            || Ok::<_, BoxError>("Aug-04-2015".to_string()),
            "%b-%d-%Y",
            temporal::is_within(2, DurationUnit::Days, reference),
        );
        assert!(ok.evaluate(&en()).is_pass());

        let garbage = Condition::parsed(
            "due date",
            || Ok::<_, BoxError>("soon".to_string()),
            "%b-%d-%Y",
            temporal::is_within(2, DurationUnit::Days, reference),
        );
        assert!(garbage.evaluate(&en()).is_error());
    }
}
