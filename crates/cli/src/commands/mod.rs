//! CLI Commands

use std::process::ExitCode;

use uiverify_common::classifier::OutcomeSummary;

pub mod classify;
pub mod init;
pub mod run;

/// Exit status when any test failed, stopped or a configuration method failed
pub const EXIT_FAILURES: u8 = 1;

/// Exit status when the runner itself could not complete
pub const EXIT_RUNNER_ERROR: u8 = 2;

pub fn exit_code(summary: &OutcomeSummary) -> ExitCode {
    if summary.has_failures() {
        ExitCode::from(EXIT_FAILURES)
    } else {
        ExitCode::SUCCESS
    }
}
