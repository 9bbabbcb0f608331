//! uiverify CLI - Main Entry Point
//!
//! Runs declarative UI check specs against a live page and classifies the
//! recorded outcomes.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{classify, init, run};

/// uiverify - soft assertions and outcome reports for UI tests
#[derive(Parser)]
#[command(name = "uiverify")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(
        short,
        long,
        default_value = "uiverify.toml",
        env = "UIVERIFY_CONFIG",
        global = true
    )]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run check specs and write a classified report
    Run(run::RunArgs),

    /// Classify previously recorded outcomes
    Classify(classify::ClassifyArgs),

    /// Write a default configuration file
    Init(init::InitArgs),

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    uiverify_common::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => run::execute(args, &cli.config, cli.format),
        Commands::Classify(args) => classify::execute(args, cli.format),
        Commands::Init(args) => init::execute(args, &cli.config).map(|()| ExitCode::SUCCESS),
        Commands::Version => {
            println!("uiverify v{}", uiverify_common::VERSION);
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            output::print_error(&format!("{:#}", err));
            ExitCode::from(commands::EXIT_RUNNER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "uiverify",
            "run",
            "--tag",
            "smoke",
            "--browser",
            "firefox",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, output::OutputFormat::Json);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.tag.as_deref(), Some("smoke"));
                assert_eq!(
                    args.browser,
                    Some(uiverify_e2e::playwright::Browser::Firefox)
                );
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_unknown_browser_rejected() {
        assert!(Cli::try_parse_from(["uiverify", "run", "--browser", "netscape"]).is_err());
    }

    #[test]
    fn test_classify_takes_input_path() {
        let cli = Cli::try_parse_from(["uiverify", "classify", "results.json"]).unwrap();
        match cli.command {
            Commands::Classify(args) => assert_eq!(args.input, PathBuf::from("results.json")),
            _ => panic!("expected classify"),
        }
    }
}
