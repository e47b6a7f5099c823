//! Time-windowed export pipeline
//!
//! This module provides the export side of Strata:
//! - Stage traits and the registry resolving them by name ([`pipeline`])
//! - Built-in retrievers, formatters and stores
//! - Artifact naming ([`filename`])
//! - Run coordination and reporting

pub mod coordinator;
pub mod filename;
pub mod formatter;
pub mod pipeline;
pub mod retriever;
pub mod store;
pub mod summary;

pub use coordinator::ExportCoordinator;
pub use pipeline::{DataFormatter, DataPipeline, DataRetriever, DataStore, StageRegistry};
pub use summary::{ExportError, ExportErrorType, ExportSummary, ExportedArtifact};
