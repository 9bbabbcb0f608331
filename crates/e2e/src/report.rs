//! JSON report sink

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use uiverify_common::classifier::{ClassifiedOutcomes, OutcomeSummary, RecordedOutcome};

use crate::error::E2eResult;
use crate::playwright::CapturedScreenshot;
use crate::runner::SuiteRun;

pub const REPORT_FILE: &str = "uiverify-results.json";

/// Classified results of one run, as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub summary: OutcomeSummary,
    pub results: ClassifiedOutcomes,
    /// Raw outcomes in execution order, so the report can be re-classified
    pub recorded: Vec<RecordedOutcome>,
    pub screenshots: Vec<CapturedScreenshot>,
}

impl RunReport {
    pub fn from_run(run: &SuiteRun) -> Self {
        let results = run.classify();
        Self {
            generated_at: Utc::now(),
            duration_ms: run.duration_ms,
            summary: results.summary(),
            results,
            recorded: run.outcomes.clone(),
            screenshots: run.screenshots.clone(),
        }
    }
}

/// Writes reports under an output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE)
    }

    /// Write the report as pretty JSON
    pub fn write(&self, report: &RunReport) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.path();
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Read recorded outcomes from either a bare JSON array or a written report.
pub fn read_outcomes(path: &Path) -> E2eResult<Vec<RecordedOutcome>> {
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Vec<RecordedOutcome>>(&content) {
        Ok(outcomes) => Ok(outcomes),
        Err(_) => {
            let report: RunReport = serde_json::from_str(&content)?;
            Ok(report.recorded)
        }
    }
}
