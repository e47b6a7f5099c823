//! Serialize command implementation
//!
//! Prints the JSON document of a resolvable path such as
//! `/Subjects/s1.deep.-identify`, the same view the exporters render.

use super::exit_codes;
use super::Runtime;
use crate::config::load_config;
use clap::Args;

/// Arguments for the serialize command
#[derive(Args, Debug)]
pub struct SerializeArgs {
    /// Node path followed by optional selectors and filters
    pub path: String,

    /// Print on one line
    #[arg(long)]
    pub compact: bool,
}

impl SerializeArgs {
    /// Execute the serialize command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
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

        let document = {
            let session = runtime.repository.open_session()?;
            runtime.engine.serialize_path(session.as_ref(), &self.path)?
        };

        match document {
            Some(document) => {
                let text = if self.compact {
                    serde_json::to_string(&document)?
                } else {
                    serde_json::to_string_pretty(&document)?
                };
                println!("{text}");
                Ok(exit_codes::SUCCESS)
            }
            None => {
                eprintln!("❌ Nothing found at {}", self.path);
                Ok(exit_codes::RESOURCE_FAILURES)
            }
        }
    }
}
