//! Run Command

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{ensure, Context, Result};
use clap::Args;
use tracing::info;

use uiverify_common::NumberLocale;
use uiverify_e2e::playwright::Browser;
use uiverify_e2e::{
    E2eConfig, PlaywrightProvider, ReportWriter, RunReport, SpecFilter, SuiteRunner, VisualTester,
};

use crate::output::{print_info, print_report, OutputFormat};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Check spec directory (overrides `specs_dir`)
    #[arg(short, long)]
    pub specs: Option<PathBuf>,

    /// Run only specs with this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Run only the spec with this name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Base URL of the application under test
    #[arg(long, env = "UIVERIFY_BASE_URL")]
    pub base_url: Option<String>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long)]
    pub browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Report directory (overrides `output_dir`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number locale for diagnostics, e.g. de-DE
    #[arg(long)]
    pub locale: Option<NumberLocale>,

    /// Create missing visual baselines from this run's screenshots
    #[arg(long)]
    pub update_baselines: bool,

    /// Do not capture diagnostic screenshots
    #[arg(long)]
    pub no_screenshots: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of the file configuration.
    pub fn apply(&self, config: &mut E2eConfig) {
        if let Some(specs) = &self.specs {
            config.specs_dir = specs.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.playwright.base_url = base_url.clone();
        }
        if let Some(browser) = self.browser {
            config.playwright.browser = browser;
        }
        if self.headed {
            config.playwright.headless = false;
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(locale) = &self.locale {
            config.verification.locale = locale.clone();
        }
        if self.update_baselines {
            config.visual.auto_update = true;
        }
        if self.no_screenshots {
            config.verification.capture_diagnostics = false;
        }
    }

    fn filter(&self) -> SpecFilter {
        SpecFilter {
            tag: self.tag.clone(),
            name: self.name.clone(),
        }
    }
}

pub fn execute(args: RunArgs, config_path: &Path, format: OutputFormat) -> Result<ExitCode> {
    let mut config = E2eConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    args.apply(&mut config);

    ensure!(
        config.specs_dir.is_dir(),
        "spec directory not found: {}",
        config.specs_dir.display()
    );

    info!("Specs: {}", config.specs_dir.display());
    info!("Base URL: {}", config.playwright.base_url);
    info!("Browser: {}", config.playwright.browser);

    let provider = PlaywrightProvider::new(
        config.playwright.clone(),
        config.verification.screenshot_dir.clone(),
    )?;
    let visual = VisualTester::new(config.visual.clone())?;
    let runner = SuiteRunner::new(provider, visual, config.verification.clone());

    let run = runner.run_dir(&config.specs_dir, &args.filter());
    let report = RunReport::from_run(&run);
    let path = ReportWriter::new(&config.output_dir).write(&report)?;

    print_report(&report.results, format);
    print_info(&format!("Report: {}", path.display()));

    Ok(super::exit_code(&report.summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = E2eConfig::default();
        let args = RunArgs {
            specs: Some(PathBuf::from("ui/specs")),
            base_url: Some("http://localhost:5173".to_string()),
            browser: Some(Browser::Firefox),
            headed: true,
            locale: Some(NumberLocale::de_de()),
            no_screenshots: true,
            ..RunArgs::default()
        };
        args.apply(&mut config);

        assert_eq!(config.specs_dir, PathBuf::from("ui/specs"));
        assert_eq!(config.playwright.base_url, "http://localhost:5173");
        assert_eq!(config.playwright.browser, Browser::Firefox);
        assert!(!config.playwright.headless);
        assert_eq!(config.verification.locale, NumberLocale::de_de());
        assert!(!config.verification.capture_diagnostics);
        assert!(!config.visual.auto_update);
        assert_eq!(config.output_dir, E2eConfig::default().output_dir);
    }

    #[test]
    fn test_missing_spec_directory_is_a_runner_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            specs: Some(dir.path().join("missing")),
            ..RunArgs::default()
        };
        let err = execute(args, &dir.path().join("uiverify.toml"), OutputFormat::Plain)
            .unwrap_err();
        assert!(err.to_string().contains("spec directory not found"));
    }
}
