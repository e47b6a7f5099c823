//! Passthrough formatter for stored files

use crate::adapters::repository::RepositorySession;
use crate::config::ExportConfigDefinition;
use crate::core::export::pipeline::DataFormatter;
use crate::domain::{
    node_types, property_names, ResourceIdentifier, ResourceRepresentation, Result, StrataError,
    TimeWindow, Value,
};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";
const DEFAULT_EXTENSION: &str = "bin";

/// Passes stored file content through unchanged
///
/// The resource must be an `nt:file` whose `nt:resource` child holds binary
/// `jcr:data`; anything else is skipped.
pub struct RawFormatter;

impl DataFormatter for RawFormatter {
    fn name(&self) -> &str {
        "raw"
    }

    fn format(
        &self,
        identifier: &ResourceIdentifier,
        _window: &TimeWindow,
        _config: &ExportConfigDefinition,
        session: &dyn RepositorySession,
    ) -> Result<Option<ResourceRepresentation>> {
        let resolution = session
            .resolve(&identifier.export_path)
            .map_err(|e| StrataError::Formatting(e.to_string()))?
            .ok_or_else(|| {
                StrataError::Formatting(format!(
                    "Export path {} does not resolve",
                    identifier.export_path
                ))
            })?;
        let file = resolution.node;
        if !file.is_type(node_types::FILE) {
            tracing::debug!(path = %file.path, node_type = %file.primary_type, "Not a file, skipping");
            return Ok(None);
        }

        let children = session
            .children(&file.path)
            .map_err(|e| StrataError::Formatting(e.to_string()))?;
        let Some(resource) = children.iter().find(|c| c.is_type(node_types::RESOURCE)) else {
            tracing::debug!(path = %file.path, "File has no content node, skipping");
            return Ok(None);
        };

        if resource.property(property_names::DATA).is_none() {
            tracing::debug!(path = %file.path, "File has no data, skipping");
            return Ok(None);
        }
        let data = session
            .read_property(resource, property_names::DATA)
            .map_err(|e| StrataError::Formatting(e.to_string()))?;
        let Some(Value::Binary(content)) = data.first().cloned() else {
            tracing::debug!(path = %file.path, "File content is not binary, skipping");
            return Ok(None);
        };

        let mime_type = resource
            .string(property_names::MIME_TYPE)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        Ok(Some(ResourceRepresentation {
            identifier: identifier.clone(),
            content,
            mime_type,
            contents_summary: vec![file.path.to_string()],
            artifact_kind: "attachment".to_string(),
            extension: extension_of(file.name()),
        }))
    }
}

fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}
