//! Domain models and types for Strata.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`NodePath`], [`ExportName`])
//! - **Content model** ([`Node`], [`Property`], [`Value`])
//! - **Export model** ([`ResourceIdentifier`], [`ResourceRepresentation`], [`TimeWindow`])
//! - **Path suffixes** ([`PathInfo`]) shared by resolution and export paths
//! - **Error types** ([`StrataError`], [`RepositoryError`]) and the [`Result`] alias
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, StrataError>`]:
//!
//! ```rust
//! use strata::domain::{NodePath, Result, StrataError};
//!
//! fn parse(raw: &str) -> Result<NodePath> {
//!     NodePath::new(raw).map_err(StrataError::Validation)
//! }
//! # assert!(parse("/Subjects").is_ok());
//! ```

pub mod errors;
pub mod ids;
pub mod node;
pub mod path_info;
pub mod resource;
pub mod result;
pub mod window;

pub use errors::{RepositoryError, StrataError};
pub use ids::{ExportName, NodePath};
pub use node::{node_types, property_names, Node, Property, PropertyValue, Value};
pub use path_info::PathInfo;
pub use resource::{ResourceIdentifier, ResourceRepresentation};
pub use result::Result;
pub use window::{RunMode, TimeWindow};
