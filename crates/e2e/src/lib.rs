//! uiverify suite runner
//!
//! Runs declarative YAML check specs against a live page through Playwright,
//! using the soft-assertion engine from `uiverify-common`:
//! - each spec becomes one test with a fresh verification context
//! - element checks probe the page with one generated Node script per query
//! - visual checks compare full-page screenshots with baselines
//! - every attempt is recorded, classified and written as a JSON report
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  SuiteRunner<SessionProvider>               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  run_dir(specs, filter) -> SuiteRun                         │
//! │    ├── CheckSpec::from_file      (YAML, validated)          │
//! │    ├── provider.open(spec)       -> PageSession             │
//! │    ├── VerificationContext::check / verify per group        │
//! │    └── flush() -> RecordedOutcome per attempt               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ReportWriter                                               │
//! │    └── uiverify-results.json  (ClassifiedOutcomes)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod playwright;
pub mod report;
pub mod runner;
pub mod spec;
pub mod visual;

pub use config::E2eConfig;
pub use error::{E2eError, E2eResult};
pub use playwright::{PlaywrightProvider, PlaywrightSession};
pub use report::{ReportWriter, RunReport};
pub use runner::{PageSession, SessionProvider, SpecFilter, SuiteRun, SuiteRunner};
pub use spec::CheckSpec;
pub use visual::VisualTester;
