//! JSON formatter

use super::{contents_summary, serialize_export_path};
use crate::adapters::repository::RepositorySession;
use crate::config::ExportConfigDefinition;
use crate::core::export::pipeline::DataFormatter;
use crate::core::serialize::SerializationEngine;
use crate::domain::{ResourceIdentifier, ResourceRepresentation, Result, TimeWindow};
use std::sync::Arc;

/// Renders the filtered JSON document of a resource
pub struct JsonFormatter {
    engine: Arc<SerializationEngine>,
}

impl JsonFormatter {
    /// Creates a formatter rendering through `engine`
    pub fn new(engine: Arc<SerializationEngine>) -> Self {
        Self { engine }
    }
}

impl DataFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn format(
        &self,
        identifier: &ResourceIdentifier,
        _window: &TimeWindow,
        _config: &ExportConfigDefinition,
        session: &dyn RepositorySession,
    ) -> Result<Option<ResourceRepresentation>> {
        let document = serialize_export_path(&self.engine, session, identifier)?;
        let content = serde_json::to_vec(&document)?;
        Ok(Some(ResourceRepresentation {
            identifier: identifier.clone(),
            content,
            mime_type: "application/json".to_string(),
            contents_summary: contents_summary(&document),
            artifact_kind: "data".to_string(),
            extension: "json".to_string(),
        }))
    }
}
