//! Core logic for Strata.
//!
//! # Modules
//!
//! - [`serialize`] - Processor registry and the JSON serialization engine
//! - [`export`] - Retrieve, format and store stages and their coordination
//! - [`verification`] - Read-back verification of stored artifacts
//!
//! # Export Workflow
//!
//! 1. **Resolve**: Look the retriever, formatter and store up by name
//! 2. **Validate**: Check the store parameters
//! 3. **Retrieve**: Select the resources that changed in the window
//! 4. **Format**: Render each resource through its export path
//! 5. **Store**: Write the artifact under its templated file name
//! 6. **Verify** (optional): Read artifacts back and compare checksums
//! 7. **Report**: Log the export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use strata::adapters::repository::create_repository;
//! use strata::config::load_config;
//! use strata::core::export::{ExportCoordinator, StageRegistry};
//! use strata::core::serialize::{builtin_registry, SerializationEngine};
//! use strata::domain::TimeWindow;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("strata.toml")?;
//! let repository = create_repository(&config.repository)?;
//! let engine = Arc::new(SerializationEngine::new(Arc::new(builtin_registry()?)));
//! let stages = Arc::new(StageRegistry::with_builtin(engine)?);
//!
//! let coordinator = ExportCoordinator::new(repository, stages);
//! let today = chrono::Utc::now().date_naive();
//! for export in &config.exports {
//!     let window = TimeWindow::scheduled(export.frequency_in_days, today)?;
//!     let summary = coordinator.run(export, &window, chrono::Utc::now()).await?;
//!     println!("{}: {} exported, {} failed", export.name, summary.exported, summary.failed);
//! }
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod serialize;
pub mod verification;
