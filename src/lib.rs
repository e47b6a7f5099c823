// Strata - Incremental export and serialization of content trees
// Copyright (c) 2025 Strata Contributors
// Licensed under the MIT License

//! # Strata - Incremental export and serialization of content trees
//!
//! Strata renders nodes of a hierarchical content repository as JSON and
//! periodically exports the resources that changed in a time window.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Serializing** nodes through a registry of pluggable JSON processors,
//!   selected per request with path selectors such as `.deep.-identify`
//! - **Retrieving** the subjects, forms, questionnaires or files modified in
//!   a window
//! - **Formatting** each resource as JSON, CSV/TSV or its raw bytes
//! - **Storing** artifacts atomically under templated file names
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Serialization engine, export stages and verification
//! - [`adapters`] - Content repository access
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use strata::adapters::repository::{create_repository, ContentRepository};
//! use strata::config::load_config;
//! use strata::core::serialize::{builtin_registry, SerializationEngine};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("strata.toml")?;
//! let repository = create_repository(&config.repository)?;
//! let engine = SerializationEngine::new(Arc::new(builtin_registry()?));
//!
//! let session = repository.open_session()?;
//! if let Some(json) = engine.serialize_path(session.as_ref(), "/Subjects/s1.deep")? {
//!     println!("{}", serde_json::to_string_pretty(&json)?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Time Windows
//!
//! Exports select resources modified in `[start, end)`. A scheduled run of
//! an export with `frequency_in_days = 7` covers the seven days before
//! today; a manual run may leave the end open.
//!
//! ```rust
//! use strata::domain::TimeWindow;
//! use chrono::NaiveDate;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let today = NaiveDate::from_ymd_opt(2024, 5, 10).ok_or("bad date")?;
//! let window = TimeWindow::scheduled(7, today)?;
//! assert!(window.end().is_some());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Error Handling
//!
//! Strata uses [`domain::StrataError`] for all library errors:
//!
//! ```rust,no_run
//! use strata::domain::StrataError;
//!
//! fn example() -> Result<(), StrataError> {
//!     let config = strata::config::load_config("strata.toml")?;
//!     println!("{} export(s) configured", config.exports.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;

pub use crate::core::export::{ExportCoordinator, ExportSummary};
pub use crate::core::serialize::{builtin_registry, SerializationEngine};
pub use domain::{Result, StrataError};
