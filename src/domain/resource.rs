//! Exported resource identifiers and their formatted representations

use crate::domain::ids::NodePath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resource selected for export
///
/// `export_path` re-resolves the filtered, time-scoped view that made the
/// resource qualify; formatters must resolve through it rather than through
/// `source_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    pub source_path: NodePath,
    pub label: String,
    pub export_path: String,
}

impl ResourceIdentifier {
    /// Creates an identifier for `source_path`
    pub fn new(source_path: NodePath, label: impl Into<String>, export_path: impl Into<String>) -> Self {
        Self {
            source_path,
            label: label.into(),
            export_path: export_path.into(),
        }
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.source_path)
    }
}

/// Output of a formatter, consumed by a store
#[derive(Debug, Clone)]
pub struct ResourceRepresentation {
    pub identifier: ResourceIdentifier,
    pub content: Vec<u8>,
    pub mime_type: String,
    /// Paths of the items bundled in the artifact
    pub contents_summary: Vec<String>,
    /// Short artifact kind used in file names, e.g. `data` or `table`
    pub artifact_kind: String,
    /// File extension without the dot
    pub extension: String,
}

impl ResourceRepresentation {
    /// Content length in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}
