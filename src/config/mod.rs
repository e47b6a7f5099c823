//! Configuration management for Strata.
//!
//! Strata reads one TOML file with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `STRATA_*` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [repository]
//! fixture = "content.json"
//!
//! [verification]
//! enabled = true
//!
//! [logging]
//! local_enabled = true
//! local_path = "logs"
//! local_rotation = "daily"
//!
//! [[export]]
//! name = "nightly-subjects"
//! retriever = "changedSubjects"
//! formatter = "json"
//! store = "filesystem"
//! frequency_in_days = 1
//! file_name_format = "{resourceLabel}_{kind}_{now(%Y%m%d)}"
//!
//! [export.parameters]
//! savePath = "${STRATA_EXPORT_DIR}"
//! excludeStatus = ["INCOMPLETE", "INVALID"]
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use strata::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("strata.toml")?;
//! for export in &config.exports {
//!     println!("{}: {} -> {} -> {}", export.name, export.retriever, export.formatter, export.store);
//! }
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ExportConfigDefinition, LoggingConfig, Parameters, RepositoryConfig,
    StrataConfig, VerificationConfig,
};
