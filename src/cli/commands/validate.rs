//! Validate config command implementation
//!
//! Loads the configuration, then checks that every export names known
//! stages and carries the parameters its store needs.

use super::exit_codes;
use crate::config::{load_config, StrataConfig};
use crate::core::export::StageRegistry;
use crate::core::serialize::{builtin_registry, SerializationEngine};
use clap::Args;
use std::sync::Arc;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(exit_codes::CONFIGURATION);
            }
        };

        let engine = Arc::new(SerializationEngine::new(Arc::new(builtin_registry()?)));
        let stages = StageRegistry::with_builtin(engine)?;
        let problems = check_exports(&config, &stages);

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Repository Fixture: {}", config.repository.fixture);
        println!("  Verification: {}", config.verification.enabled);
        println!("  File Logging: {}", config.logging.local_enabled);
        println!("  Exports: {}", config.exports.len());
        for export in &config.exports {
            println!(
                "    - {}: {} -> {} -> {} (every {} day(s), \"{}\")",
                export.name,
                export.retriever,
                export.formatter,
                export.store,
                export.frequency_in_days,
                export.file_name_format
            );
        }
        println!();

        if problems.is_empty() {
            println!("✅ Configuration is valid");
            Ok(exit_codes::SUCCESS)
        } else {
            println!("❌ Configuration validation failed");
            for problem in &problems {
                println!("   Error: {problem}");
            }
            Ok(exit_codes::CONFIGURATION)
        }
    }
}

/// Problems that would abort a run before any resource is processed
fn check_exports(config: &StrataConfig, stages: &StageRegistry) -> Vec<String> {
    let mut problems = Vec::new();
    for export in &config.exports {
        match stages.build_pipeline(export) {
            Ok(pipeline) => {
                if let Err(e) = pipeline.store.validate(export) {
                    problems.push(e.to_string());
                }
            }
            Err(e) => problems.push(format!("export '{}': {e}", export.name)),
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_check_exports() {
        let config = parse_config(
            r#"
[repository]
fixture = "content.json"

[[export]]
name = "good"
retriever = "changedForms"
formatter = "json"
store = "filesystem"
parameters = { savePath = "/tmp/out" }

[[export]]
name = "no-save-path"
retriever = "changedForms"
formatter = "json"
store = "filesystem"

[[export]]
name = "unknown-formatter"
retriever = "changedForms"
formatter = "xml"
store = "filesystem"
parameters = { savePath = "/tmp/out" }
"#,
        )
        .unwrap();
        let engine = Arc::new(SerializationEngine::new(Arc::new(builtin_registry().unwrap())));
        let stages = StageRegistry::with_builtin(engine).unwrap();

        let problems = check_exports(&config, &stages);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("savePath"));
        assert!(problems[1].contains("Unknown formatter 'xml'"));
    }
}
