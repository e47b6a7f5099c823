//! Domain identifier types with validation
//!
//! Newtype wrappers for repository paths and export configuration names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Absolute path of a node in the content tree
///
/// Paths start with `/`, use `/` as separator and never contain empty
/// segments. The root node has the path `/`.
///
/// # Examples
///
/// ```
/// use strata::domain::ids::NodePath;
///
/// let path = NodePath::new("/Subjects/s1").unwrap();
/// assert_eq!(path.name(), "s1");
/// assert_eq!(path.parent().unwrap().as_str(), "/Subjects");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath(String);

impl NodePath {
    /// Creates a new NodePath, validating its shape
    pub fn new(path: impl Into<String>) -> Result<Self, String> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(format!("Node path must be absolute, got: {path}"));
        }
        if path == "/" {
            return Ok(Self(path));
        }
        if path.ends_with('/') || path[1..].split('/').any(str::is_empty) {
            return Err(format!("Node path contains empty segments: {path}"));
        }
        Ok(Self(path))
    }

    /// The root path `/`
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Returns the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the root path
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Last segment of the path, empty for the root
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Parent path, `None` for the root
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Path of a direct child with the given name
    pub fn join(&self, name: &str) -> Result<NodePath, String> {
        if name.is_empty() || name.contains('/') {
            return Err(format!("Invalid node name: {name:?}"));
        }
        if self.is_root() {
            Ok(Self(format!("/{name}")))
        } else {
            Ok(Self(format!("{}/{name}", self.0)))
        }
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodePath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NodePath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.0
    }
}

impl AsRef<str> for NodePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name of an export configuration
///
/// Export names appear in logs and summaries and are used to select
/// configurations from the CLI, so they are restricted to
/// `[A-Za-z0-9_.-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExportName(String);

impl ExportName {
    /// Creates a new ExportName from a string
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Export name cannot be empty".to_string());
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(format!("Export name '{name}' contains invalid character {c:?}"));
        }
        Ok(Self(name))
    }

    /// Returns the export name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExportName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ExportName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExportName> for String {
    fn from(name: ExportName) -> Self {
        name.0
    }
}

impl AsRef<str> for ExportName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
