//! check / verify: running ordered batches of conditions
//!
//! One [`VerificationContext`] exists per test execution. It owns that test's
//! [`AssertionLedger`] and diagnostic collaborator, and is passed explicitly
//! to every call; nothing here is process-wide.
//!
//! Both entry points evaluate conditions strictly in order and stop at the
//! first `Error`. They differ only in where failures go:
//!
//! - `check` records each `Fail` in the ledger and returns `Ok`; the test
//!   decides when to `flush`.
//! - `verify` keeps failures local and raises one aggregated failure when the
//!   batch completes.

use tracing::{debug, warn};

use crate::condition::{Outcome, Verifiable};
use crate::config::VerificationConfig;
use crate::error::{BoxError, Error, FailureRecord, Result};
use crate::ledger::AssertionLedger;
use crate::locale::NumberLocale;

/// Diagnostic side effect run inline when a condition fails or errors
pub trait Screenshot: Send {
    /// Blocking capture; `label` names the condition being reported.
    fn capture(&mut self, label: &str) -> std::result::Result<(), BoxError>;
}

/// Diagnostic collaborator that captures nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScreenshot;

impl Screenshot for NoScreenshot {
    fn capture(&mut self, _label: &str) -> std::result::Result<(), BoxError> {
        Ok(())
    }
}

impl<F> Screenshot for F
where
    F: FnMut(&str) -> std::result::Result<(), BoxError> + Send,
{
    fn capture(&mut self, label: &str) -> std::result::Result<(), BoxError> {
        self(label)
    }
}

/// Per-test verification state
pub struct VerificationContext {
    test_name: String,
    ledger: AssertionLedger,
    screenshot: Box<dyn Screenshot>,
    locale: NumberLocale,
    capture_diagnostics: bool,
}

impl VerificationContext {
    pub fn new(test_name: impl Into<String>) -> Self {
        Self::with_config(test_name, &VerificationConfig::default())
    }

    pub fn with_config(test_name: impl Into<String>, config: &VerificationConfig) -> Self {
        Self {
            test_name: test_name.into(),
            ledger: AssertionLedger::new(),
            screenshot: Box::new(NoScreenshot),
            locale: config.locale.clone(),
            capture_diagnostics: config.capture_diagnostics,
        }
    }

    pub fn with_screenshot(mut self, screenshot: impl Screenshot + 'static) -> Self {
        self.screenshot = Box::new(screenshot);
        self
    }

    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    pub fn locale(&self) -> &NumberLocale {
        &self.locale
    }

    pub fn ledger(&self) -> &AssertionLedger {
        &self.ledger
    }

    /// Accumulate-and-continue, capturing diagnostics per the configured default.
    pub fn check(&mut self, conditions: Vec<Box<dyn Verifiable>>) -> Result<()> {
        self.check_with(self.capture_diagnostics, conditions)
    }

    pub fn check_with(
        &mut self,
        capture_diagnostics: bool,
        conditions: Vec<Box<dyn Verifiable>>,
    ) -> Result<()> {
        let Self {
            test_name,
            ledger,
            screenshot,
            locale,
            ..
        } = self;
        run_batch(
            test_name,
            screenshot.as_mut(),
            locale,
            capture_diagnostics,
            conditions,
            &mut |record: FailureRecord| ledger.record_failure(record),
        )
    }

    /// Fail-fast after the batch, capturing diagnostics per the configured default.
    pub fn verify(&mut self, conditions: Vec<Box<dyn Verifiable>>) -> Result<()> {
        self.verify_with(self.capture_diagnostics, conditions)
    }

    pub fn verify_with(
        &mut self,
        capture_diagnostics: bool,
        conditions: Vec<Box<dyn Verifiable>>,
    ) -> Result<()> {
        let mut failures = Vec::new();
        let batch = run_batch(
            &self.test_name,
            self.screenshot.as_mut(),
            &self.locale,
            capture_diagnostics,
            conditions,
            &mut |record: FailureRecord| failures.push(record),
        );
        if let Err(err) = batch {
            if !failures.is_empty() {
                debug!(
                    test = %self.test_name,
                    superseded = failures.len(),
                    "error takes precedence over failures in this batch"
                );
            }
            return Err(err);
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::AssertionFailed(crate::error::AssertionFailure::new(
                failures,
            )))
        }
    }

    /// Raise the aggregated failure for everything `check` recorded since the last flush.
    pub fn flush(&mut self) -> Result<()> {
        self.ledger.flush()
    }

    /// Clear state left by a previous test on the same execution unit.
    pub fn reset(&mut self) {
        self.ledger.reset();
    }
}

impl Drop for VerificationContext {
    fn drop(&mut self) {
        if self.ledger.has_pending_failures() {
            warn!(
                test = %self.test_name,
                pending = self.ledger.pending().len(),
                "verification context dropped with unflushed failures"
            );
        }
    }
}

fn run_batch(
    test_name: &str,
    screenshot: &mut dyn Screenshot,
    locale: &NumberLocale,
    capture_diagnostics: bool,
    conditions: Vec<Box<dyn Verifiable>>,
    on_fail: &mut dyn FnMut(FailureRecord),
) -> Result<()> {
    let total = conditions.len();
    for (index, condition) in conditions.into_iter().enumerate() {
        let description = condition.description().to_string();
        match condition.evaluate(locale) {
            Outcome::Pass => {
                debug!(test = %test_name, condition = %description, "pass");
            }
            Outcome::Fail(diagnostic) => {
                warn!(test = %test_name, condition = %description, %diagnostic, "fail");
                if capture_diagnostics {
                    screenshot
                        .capture(&description)
                        .map_err(|source| Error::Screenshot {
                            condition: description.clone(),
                            source,
                        })?;
                }
                on_fail(FailureRecord {
                    condition: description,
                    diagnostic,
                });
            }
            Outcome::Error(source) => {
                warn!(
                    test = %test_name,
                    condition = %description,
                    error = %source,
                    skipped = total - index - 1,
                    "error, aborting batch"
                );
                if capture_diagnostics {
                    if let Err(err) = screenshot.capture(&description) {
                        warn!(test = %test_name, error = %err, "screenshot failed while reporting error");
                    }
                }
                return Err(Error::Condition {
                    condition: description,
                    source,
                });
            }
        }
    }
    Ok(())
}

impl std::fmt::Debug for VerificationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationContext")
            .field("test_name", &self.test_name)
            .field("ledger", &self.ledger)
            .field("locale", &self.locale)
            .field("capture_diagnostics", &self.capture_diagnostics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::expect;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_screenshot(counter: Arc<AtomicUsize>) -> impl Screenshot {
        move |_label: &str| -> std::result::Result<(), BoxError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_check_defers_until_flush() {
        let mut ctx = VerificationContext::new("deferred");
        ctx.check(vec![Condition::value("flag", false, expect::is_true()).boxed()])
            .unwrap();
        assert!(ctx.ledger().has_pending_failures());
        assert!(ctx.flush().unwrap_err().is_assertion_failure());
        assert!(ctx.flush().is_ok());
    }

    #[test]
    fn test_capture_flag_disables_screenshots() {
        let shots = Arc::new(AtomicUsize::new(0));
        let mut ctx = VerificationContext::new("quiet")
            .with_screenshot(counting_screenshot(Arc::clone(&shots)));
        ctx.check_with(false, vec![Condition::value("n", 1, expect::is_equal_to(2)).boxed()])
            .unwrap();
        assert_eq!(shots.load(Ordering::SeqCst), 0);
        ctx.reset();
    }

    #[test]
    fn test_screenshot_failure_aborts_call() {
        let mut ctx = VerificationContext::new("broken camera").with_screenshot(
            |_label: &str| -> std::result::Result<(), BoxError> { Err("no browser session".into()) },
        );
        let err = ctx
            .check(vec![
                Condition::value("first", 1, expect::is_equal_to(2)).boxed(),
                Condition::value("second", 1, expect::is_equal_to(2)).boxed(),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::Screenshot { ref condition, .. } if condition == "first"));
        assert!(!ctx.ledger().has_pending_failures());
    }
}
