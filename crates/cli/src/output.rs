//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use uiverify_common::classifier::{ClassifiedOutcomes, OutcomeBucket, OutcomeSummary};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No outcomes recorded.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(items).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                let row = item.row();
                for (header, value) in T::headers().iter().zip(row.iter()) {
                    println!("{}: {}", header, value);
                }
            }
        }
    }
}

/// One classified outcome, flattened for display
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRow {
    pub bucket: &'static str,
    pub class: String,
    pub method: String,
    pub duration_ms: u64,
    pub started_at: String,
    pub cause: String,
}

impl OutcomeRow {
    /// Rows in bucket order, then class and method order.
    pub fn collect(classified: &ClassifiedOutcomes) -> Vec<Self> {
        OutcomeBucket::ALL
            .iter()
            .flat_map(|bucket| {
                classified.bucket(*bucket).iter().map(move |outcome| OutcomeRow {
                    bucket: bucket.label(),
                    class: outcome.class_name.clone(),
                    method: outcome.method_name.clone(),
                    duration_ms: outcome.duration_ms,
                    started_at: outcome
                        .started_at
                        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    cause: outcome
                        .cause
                        .as_ref()
                        .map(|cause| first_line(&cause.to_string()))
                        .unwrap_or_default(),
                })
            })
            .collect()
    }
}

impl TableDisplay for OutcomeRow {
    fn headers() -> Vec<&'static str> {
        vec!["Result", "Class", "Method", "Duration", "Started", "Cause"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.bucket.to_string(),
            self.class.clone(),
            self.method.clone(),
            format!("{} ms", self.duration_ms),
            self.started_at.clone(),
            self.cause.clone(),
        ]
    }
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().to_string()
}

/// Print classified outcomes followed by the summary line
pub fn print_report(classified: &ClassifiedOutcomes, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(classified).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(classified).unwrap_or_default());
        }
        OutputFormat::Table | OutputFormat::Plain => {
            print_list(&OutcomeRow::collect(classified), format);
            println!();
            println!("{}", summary_line(&classified.summary()));
        }
    }
}

pub fn summary_line(summary: &OutcomeSummary) -> String {
    let failed = summary.failed + summary.failed_configuration;
    format!(
        "{} {}, {} {}, {} {}, {} {}, {} {}",
        summary.passed.to_string().green().bold(),
        "passed".green(),
        failed.to_string().red().bold(),
        "failed".red(),
        summary.stopped.to_string().yellow().bold(),
        "stopped".yellow(),
        summary.skipped.to_string().dimmed(),
        "skipped".dimmed(),
        summary.retried.to_string().cyan(),
        "retried".cyan(),
    )
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print info message
pub fn print_info(message: &str) {
    eprintln!("ℹ️  {}", message);
}
