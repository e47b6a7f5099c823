//! Built-in formatters
//!
//! Formatters always resolve a resource through its export path, so the
//! rendered document carries exactly the window and filters that made the
//! resource qualify.

mod csv;
mod json;
mod raw;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::raw::RawFormatter;

use crate::adapters::repository::RepositorySession;
use crate::core::serialize::SerializationEngine;
use crate::domain::{ResourceIdentifier, Result, StrataError};
use serde_json::Value;

/// Serializes the filtered view behind an export path
pub(crate) fn serialize_export_path(
    engine: &SerializationEngine,
    session: &dyn RepositorySession,
    identifier: &ResourceIdentifier,
) -> Result<Value> {
    engine
        .serialize_path(session, &identifier.export_path)
        .map_err(|e| {
            StrataError::Formatting(format!(
                "Cannot resolve {}: {e}",
                identifier.export_path
            ))
        })?
        .ok_or_else(|| {
            StrataError::Formatting(format!(
                "Export path {} does not resolve",
                identifier.export_path
            ))
        })
}

/// `@path` of every object held in an array at the top of the document
pub(crate) fn contents_summary(document: &Value) -> Vec<String> {
    let Value::Object(map) = document else {
        return Vec::new();
    };
    map.values()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|item| item.get("@path").and_then(Value::as_str))
        .map(String::from)
        .collect()
}
