//! Processors command implementation

use super::exit_codes;
use super::Runtime;
use crate::config::load_config;
use crate::core::serialize::builtin_registry;
use clap::Args;

/// Arguments for the processors command
#[derive(Args, Debug)]
pub struct ProcessorsArgs {
    /// Show which processors a resolvable path activates
    #[arg(long, value_name = "PATH")]
    pub path: Option<String>,
}

impl ProcessorsArgs {
    /// Execute the processors command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(raw) = &self.path else {
            println!("{:<12} {:>8}", "PROCESSOR", "PRIORITY");
            for processor in builtin_registry()?.processors() {
                println!("{:<12} {:>8}", processor.name(), processor.priority());
            }
            return Ok(exit_codes::SUCCESS);
        };

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_codes::CONFIGURATION);
            }
        };
        let runtime = match Runtime::from_config(&config) {
            Ok(runtime) => runtime,
            Err(e) => {
                eprintln!("❌ Failed to open repository: {e}");
                return Ok(exit_codes::CONFIGURATION);
            }
        };

        let session = runtime.repository.open_session()?;
        let Some(resolution) = session.resolve(raw)? else {
            eprintln!("❌ Nothing found at {raw}");
            return Ok(exit_codes::RESOURCE_FAILURES);
        };

        let registry = runtime.engine.registry();
        let selectors = resolution.path_info.selectors();
        let selection = registry.resolve(&resolution.node, selectors.as_slice());
        println!("Resource: {}", resolution.node);
        println!("{:<12} {:>8}  ACTIVE", "PROCESSOR", "PRIORITY");
        for processor in registry.processors() {
            let active = if selection.contains(processor.name()) { "yes" } else { "-" };
            println!("{:<12} {:>8}  {active}", processor.name(), processor.priority());
        }
        Ok(exit_codes::SUCCESS)
    }
}
