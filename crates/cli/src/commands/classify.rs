//! Classify Command
//!
//! Re-classifies outcomes recorded by another run, either a bare JSON array of
//! recorded outcomes or a `uiverify-results.json` report.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use uiverify_common::classifier::ClassifiedOutcomes;
use uiverify_e2e::report::read_outcomes;

use crate::output::{print_report, OutputFormat};

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Recorded outcomes (JSON array or uiverify report)
    pub input: PathBuf,
}

pub fn execute(args: ClassifyArgs, format: OutputFormat) -> Result<ExitCode> {
    let outcomes = read_outcomes(&args.input)
        .with_context(|| format!("reading outcomes from {}", args.input.display()))?;
    let classified = ClassifiedOutcomes::classify(outcomes);

    print_report(&classified, format);
    Ok(super::exit_code(&classified.summary()))
}
