//! Suite runner: turns check specs into recorded test outcomes
//!
//! Each attempt of each spec gets a fresh browser session and a fresh
//! [`VerificationContext`]. Nothing is shared between attempts, so retries
//! start from a clean ledger.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use uiverify_common::classifier::{
    ClassifiedOutcomes, FailureCause, MethodKind, RecordedOutcome, TestStatus,
};
use uiverify_common::element::Inspector;
use uiverify_common::runner::Screenshot;
use uiverify_common::{BoxError, VerificationConfig, VerificationContext};

use crate::error::{E2eError, E2eResult};
use crate::playwright::CapturedScreenshot;
use crate::spec::{self, CheckSpec, Mode, PageCapture};
use crate::visual::VisualTester;

/// Class name used for specs that could not be loaded
pub const SPEC_LOADER_CLASS: &str = "SpecLoader";

/// A browser session for one attempt of one spec
pub trait PageSession: Inspector + Send + Sync + 'static {
    /// Capture a diagnostic screenshot for the condition labelled `label`.
    fn capture_diagnostic(&self, label: &str) -> Result<(), BoxError>;

    /// Write a full-page screenshot to `path` (used by visual checks).
    fn write_page(&self, path: &Path) -> Result<(), BoxError>;

    /// Diagnostic screenshots taken so far.
    fn screenshots(&self) -> Vec<CapturedScreenshot>;
}

/// Opens sessions for specs
pub trait SessionProvider {
    type Session: PageSession;

    fn open(&self, spec: &CheckSpec) -> E2eResult<Self::Session>;
}

struct SessionScreenshot<S>(Arc<S>);

impl<S: PageSession> Screenshot for SessionScreenshot<S> {
    fn capture(&mut self, label: &str) -> Result<(), BoxError> {
        self.0.capture_diagnostic(label)
    }
}

/// Optional tag and name restrictions for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecFilter {
    pub tag: Option<String>,
    pub name: Option<String>,
}

impl SpecFilter {
    pub fn selects(&self, spec: &CheckSpec) -> bool {
        spec.selected_by(self.tag.as_deref(), self.name.as_deref())
    }
}

/// Everything recorded during one suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteRun {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// One entry per attempt, in execution order
    pub outcomes: Vec<RecordedOutcome>,
    pub screenshots: Vec<CapturedScreenshot>,
}

impl SuiteRun {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            duration_ms: 0,
            outcomes: Vec::new(),
            screenshots: Vec::new(),
        }
    }

    pub fn classify(&self) -> ClassifiedOutcomes {
        ClassifiedOutcomes::classify(self.outcomes.iter().cloned())
    }
}

/// Runs check specs against sessions from a [`SessionProvider`]
pub struct SuiteRunner<P: SessionProvider> {
    provider: P,
    visual: VisualTester,
    verification: VerificationConfig,
}

impl<P: SessionProvider> SuiteRunner<P> {
    pub fn new(provider: P, visual: VisualTester, verification: VerificationConfig) -> Self {
        Self {
            provider,
            visual,
            verification,
        }
    }

    /// Load every spec under `dir` and run those the filter selects.
    ///
    /// A spec file that fails to load is recorded as a failed configuration
    /// method; the remaining specs still run.
    pub fn run_dir(&self, dir: &Path, filter: &SpecFilter) -> SuiteRun {
        let mut load_failures = Vec::new();
        let mut specs = Vec::new();
        for path in spec::discover(dir) {
            match CheckSpec::from_file(&path) {
                Ok(spec) if filter.selects(&spec) => specs.push(spec),
                Ok(spec) => debug!("Filtered out: {}", spec.name),
                Err(err) => {
                    error!("✗ {} - {}", path.display(), err);
                    load_failures.push(
                        RecordedOutcome::failed(
                            SPEC_LOADER_CLASS,
                            path.display().to_string(),
                            cause_of(&err),
                        )
                        .with_kind(MethodKind::Configuration),
                    );
                }
            }
        }

        let mut run = self.run_specs(&specs);
        load_failures.append(&mut run.outcomes);
        run.outcomes = load_failures;
        run
    }

    /// Run a list of check specs
    pub fn run_specs(&self, specs: &[CheckSpec]) -> SuiteRun {
        let start = Instant::now();
        let mut run = SuiteRun::start();

        info!("Running {} spec(s)...", specs.len());
        for spec in specs {
            self.run_spec(spec, &mut run);
        }
        run.duration_ms = start.elapsed().as_millis() as u64;

        let summary = run.classify().summary();
        info!("");
        info!(
            "Results: {} passed, {} failed, {} stopped, {} skipped, {} retried ({} ms)",
            summary.passed,
            summary.failed + summary.failed_configuration,
            summary.stopped,
            summary.skipped,
            summary.retried,
            run.duration_ms
        );
        run
    }

    /// Run one spec, retrying failed attempts while retries remain
    pub fn run_spec(&self, spec: &CheckSpec, run: &mut SuiteRun) {
        if spec.skip {
            info!("- {} (skipped)", spec.test_name());
            run.outcomes.push(RecordedOutcome::new(
                spec.class.clone(),
                spec.name.clone(),
                TestStatus::Skipped,
            ));
            return;
        }

        let attempts = spec.retries.saturating_add(1);
        for attempt in 1..=attempts {
            let started_at = Utc::now();
            let start = Instant::now();
            let result = self.attempt(spec, &mut run.screenshots);
            let duration_ms = start.elapsed().as_millis() as u64;

            let outcome = match result {
                Ok(()) => {
                    info!("✓ {} ({} ms)", spec.test_name(), duration_ms);
                    RecordedOutcome::passed(spec.class.clone(), spec.name.clone())
                }
                Err(err) if attempt < attempts => {
                    warn!(
                        "↻ {} attempt {}/{} - {}",
                        spec.test_name(),
                        attempt,
                        attempts,
                        err
                    );
                    RecordedOutcome::new(spec.class.clone(), spec.name.clone(), TestStatus::Retried)
                        .with_cause(cause_of(&err))
                }
                Err(err) => {
                    error!("✗ {} - {}", spec.test_name(), err);
                    RecordedOutcome::failed(spec.class.clone(), spec.name.clone(), cause_of(&err))
                }
            };
            let passed = outcome.status == TestStatus::Passed;
            run.outcomes.push(outcome.with_timing(started_at, duration_ms));
            if passed {
                break;
            }
        }
    }

    fn attempt(&self, spec: &CheckSpec, screenshots: &mut Vec<CapturedScreenshot>) -> E2eResult<()> {
        let session = Arc::new(self.provider.open(spec)?);
        let result = self.verify_page(spec, &session);
        screenshots.extend(session.screenshots());
        result
    }

    fn verify_page(&self, spec: &CheckSpec, session: &Arc<P::Session>) -> E2eResult<()> {
        let inspector: Arc<dyn Inspector> = session.clone();
        let page_session = Arc::clone(session);
        let page: PageCapture = Arc::new(move |path: &Path| page_session.write_page(path));
        let capture = spec
            .capture_diagnostics
            .unwrap_or(self.verification.capture_diagnostics);

        let mut ctx = VerificationContext::with_config(spec.test_name(), &self.verification)
            .with_screenshot(SessionScreenshot(Arc::clone(session)));
        ctx.reset();

        for group in &spec.groups {
            debug!(test = %spec.test_name(), group = %group.name, checks = group.checks.len(), "running group");
            let conditions = group
                .checks
                .iter()
                .map(|check| check.condition(&inspector, &self.visual, &page))
                .collect();
            let batch = match spec.mode {
                Mode::Check => ctx.check_with(capture, conditions),
                Mode::Verify => ctx.verify_with(capture, conditions),
            };
            if let Err(err) = batch {
                // Anything still deferred is superseded by this error.
                ctx.reset();
                return Err(err.into());
            }
        }

        ctx.flush()?;
        Ok(())
    }
}

/// Assertion failures stay assertion failures; everything else stops the test.
pub fn cause_of(err: &E2eError) -> FailureCause {
    match err {
        E2eError::Verification(inner) => FailureCause::from_error(inner),
        other => FailureCause::exception(other.kind_name(), other.to_string()),
    }
}
