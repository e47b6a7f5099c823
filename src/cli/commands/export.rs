//! Export command implementation
//!
//! Runs the configured exports once for a window; an external scheduler
//! invokes this command once per period.

use super::exit_codes;
use super::Runtime;
use crate::config::{load_config, ExportConfigDefinition};
use crate::core::export::{ExportCoordinator, ExportSummary};
use crate::domain::{RunMode, StrataError};
use chrono::{NaiveDate, Utc};
use clap::{Args, ValueEnum};

/// How the export window is chosen
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// The `frequency_in_days` days before today
    Scheduled,
    /// Today so far
    Today,
    /// `--from` (and optionally `--to`)
    Manual,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export to run, repeatable; all configured exports when omitted
    #[arg(short, long = "name", value_name = "NAME")]
    pub names: Vec<String>,

    /// Window selection
    #[arg(long, value_enum, default_value_t = ModeArg::Scheduled)]
    pub mode: ModeArg,

    /// First day of a manual window (YYYY-MM-DD)
    #[arg(long, required_if_eq("mode", "manual"))]
    pub from: Option<NaiveDate>,

    /// Day after the last day of a manual window (YYYY-MM-DD); open when omitted
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Read stored artifacts back and compare checksums
    #[arg(long)]
    pub verify: bool,
}

impl ExportArgs {
    fn run_mode(&self) -> Option<RunMode> {
        match self.mode {
            ModeArg::Scheduled => Some(RunMode::Scheduled),
            ModeArg::Today => Some(RunMode::Today),
            ModeArg::Manual => self.from.map(|from| RunMode::Manual { from, to: self.to }),
        }
    }

    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting export command");

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_codes::CONFIGURATION);
            }
        };

        let selected: Vec<ExportConfigDefinition> = if self.names.is_empty() {
            config.exports.clone()
        } else {
            let mut selected = Vec::new();
            for name in &self.names {
                match config.export(name) {
                    Some(export) => selected.push(export.clone()),
                    None => {
                        eprintln!("❌ No export named '{name}' in {config_path}");
                        return Ok(exit_codes::CONFIGURATION);
                    }
                }
            }
            selected
        };
        if selected.is_empty() {
            println!("No exports configured, nothing to do.");
            return Ok(exit_codes::SUCCESS);
        }

        let Some(mode) = self.run_mode() else {
            eprintln!("❌ --mode manual requires --from");
            return Ok(exit_codes::CONFIGURATION);
        };

        let runtime = match Runtime::from_config(&config) {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open repository");
                eprintln!("❌ Failed to initialize export: {e}");
                return Ok(exit_codes::CONFIGURATION);
            }
        };

        let coordinator = ExportCoordinator::new(runtime.repository, runtime.stages)
            .with_verification(self.verify || config.verification.enabled);

        let now = Utc::now();
        println!("🚀 Running {} export(s)...", selected.len());
        println!();
        let results = coordinator
            .run_many(&selected, mode, now.date_naive(), now)
            .await;

        let mut exit_code = exit_codes::SUCCESS;
        for (name, result) in &results {
            let code = match result {
                Ok(summary) => {
                    print_summary(summary);
                    if summary.is_successful() {
                        exit_codes::SUCCESS
                    } else {
                        exit_codes::RESOURCE_FAILURES
                    }
                }
                Err(e) => {
                    println!("❌ Export '{name}' failed: {e}");
                    println!();
                    exit_code_for(e)
                }
            };
            exit_code = exit_code.max(code);
        }

        match exit_code {
            exit_codes::SUCCESS => println!("✅ All exports completed successfully!"),
            exit_codes::RESOURCE_FAILURES => println!("⚠️  Exports completed with failures"),
            _ => println!("❌ At least one export did not run"),
        }
        Ok(exit_code)
    }
}

fn exit_code_for(error: &StrataError) -> i32 {
    match error {
        StrataError::Configuration(_) | StrataError::Validation(_) => exit_codes::CONFIGURATION,
        StrataError::Retrieval(_) => exit_codes::RETRIEVAL,
        _ => exit_codes::FATAL,
    }
}

fn print_summary(summary: &ExportSummary) {
    println!("📊 Export '{}':", summary.export_name);
    println!("  Resources: {}", summary.total_resources);
    println!("  Exported: {}", summary.exported);
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed: {}", summary.failed);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.success_rate());

    if let Some(report) = &summary.verification_report {
        println!(
            "  Verified: {} passed, {} failed, {} skipped",
            report.passed, report.failed, report.skipped
        );
        for failure in report.failures.iter().take(10) {
            println!("    - {}: {}", failure.filename, failure.reason);
        }
        if report.failures.len() > 10 {
            println!("    ... and {} more failures", report.failures.len() - 10);
        }
    }

    if !summary.errors.is_empty() {
        println!("  ⚠️  Errors:");
        for error in &summary.errors {
            println!("    - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("      Context: {context}");
            }
        }
    }
    println!();
}
