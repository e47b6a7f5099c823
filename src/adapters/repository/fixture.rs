//! JSON content fixtures
//!
//! A fixture describes a content tree as nested JSON objects:
//!
//! ```json
//! {
//!   "children": [
//!     { "name": "Subjects", "type": "cards:SubjectsHomepage", "children": [
//!       { "name": "s1", "type": "cards:Subject", "uuid": "subject-1",
//!         "properties": {
//!           "identifier": "P-0001",
//!           "jcr:lastModified": { "type": "date", "value": "2024-05-10T08:00:00.000Z" },
//!           "type": { "type": "reference", "value": "type-patient" }
//!         } }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Plain JSON scalars map to string, boolean, long and double values; arrays
//! become multi-valued properties; objects with a `type` field carry any
//! other typed value (date, reference, path, decimal, binary as base64).

use super::memory::{MemoryRepository, MemoryRepositoryBuilder};
use crate::domain::node::NodeBuilder;
use crate::domain::{NodePath, Property, PropertyValue, RepositoryError, Result, Value};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::Path;

const DEFAULT_TYPE: &str = "nt:unstructured";

#[derive(Debug, Deserialize)]
struct FixtureRoot {
    #[serde(default)]
    children: Vec<FixtureNode>,
}

#[derive(Debug, Deserialize)]
struct FixtureNode {
    name: String,
    #[serde(rename = "type", default = "default_type")]
    primary_type: String,
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    properties: serde_json::Map<String, JsonValue>,
    #[serde(default)]
    children: Vec<FixtureNode>,
}

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

/// Loads a repository from a fixture file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid fixture.
pub fn load_fixture_file(path: impl AsRef<Path>) -> Result<MemoryRepository> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        RepositoryError::InvalidFixture(format!("cannot read {}: {e}", path.display()))
    })?;
    let repository = load_fixture_str(&contents)?;
    tracing::info!(
        fixture = %path.display(),
        nodes = repository.len(),
        "Loaded content fixture"
    );
    Ok(repository)
}

/// Loads a repository from fixture JSON text
pub fn load_fixture_str(contents: &str) -> Result<MemoryRepository> {
    let root: FixtureRoot = serde_json::from_str(contents)
        .map_err(|e| RepositoryError::InvalidFixture(format!("malformed fixture: {e}")))?;
    let mut builder = MemoryRepository::builder();
    for child in root.children {
        builder = add_node(builder, &NodePath::root(), child)?;
    }
    builder.build()
}

fn add_node(
    builder: MemoryRepositoryBuilder,
    parent: &NodePath,
    fixture: FixtureNode,
) -> Result<MemoryRepositoryBuilder> {
    let path = parent
        .join(&fixture.name)
        .map_err(RepositoryError::InvalidFixture)?;

    let mut node = NodeBuilder::new(path.as_str(), fixture.primary_type);
    if let Some(uuid) = fixture.uuid {
        node = node.identifier(uuid);
    }
    for (name, raw) in fixture.properties {
        if let Some(value) = property_value(&name, raw)? {
            node = node.property(Property { name, value });
        }
    }

    let mut builder = builder.node(node.build().map_err(RepositoryError::InvalidFixture)?);
    for child in fixture.children {
        builder = add_node(builder, &path, child)?;
    }
    Ok(builder)
}

fn property_value(name: &str, raw: JsonValue) -> Result<Option<PropertyValue>> {
    match raw {
        JsonValue::Null => Ok(None),
        JsonValue::Array(items) => {
            let values = items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(|item| scalar_value(name, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(PropertyValue::Multiple(values)))
        }
        other => Ok(Some(PropertyValue::Single(scalar_value(name, other)?))),
    }
}

fn scalar_value(name: &str, raw: JsonValue) -> Result<Value> {
    let invalid = |reason: String| -> crate::domain::StrataError {
        RepositoryError::InvalidFixture(format!("property {name}: {reason}")).into()
    };
    match raw {
        JsonValue::String(s) => Ok(Value::String(s)),
        JsonValue::Bool(b) => Ok(Value::Boolean(b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(long) => Ok(Value::Long(long)),
            None => n
                .as_f64()
                .map(Value::Double)
                .ok_or_else(|| invalid(format!("unsupported number {n}"))),
        },
        typed @ JsonValue::Object(_) => {
            serde_json::from_value(typed).map_err(|e| invalid(e.to_string()))
        }
        other => Err(invalid(format!("unsupported value {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::repository::ContentRepository;

    const FIXTURE: &str = r#"{
        "children": [
            { "name": "Subjects", "type": "cards:SubjectsHomepage", "children": [
                { "name": "s1", "type": "cards:Subject", "uuid": "subject-1",
                  "properties": {
                      "identifier": "P-0001",
                      "age": 42,
                      "score": 1.5,
                      "active": true,
                      "tags": ["a", "b"],
                      "jcr:lastModified": { "type": "date", "value": "2024-05-10T08:00:00+00:00" },
                      "type": { "type": "reference", "value": "type-patient" },
                      "notes": null
                  } }
            ] }
        ]
    }"#;

    #[test]
    fn test_load_fixture_values() {
        let repo = load_fixture_str(FIXTURE).unwrap();
        let session = repo.open_session().unwrap();
        let node = session
            .node(&NodePath::new("/Subjects/s1").unwrap())
            .unwrap()
            .unwrap();

        assert_eq!(node.identifier, "subject-1");
        assert_eq!(node.property("age").unwrap().first(), Some(&Value::Long(42)));
        assert_eq!(node.property("score").unwrap().first(), Some(&Value::Double(1.5)));
        assert_eq!(node.property("active").unwrap().first(), Some(&Value::Boolean(true)));
        assert!(node.property("tags").unwrap().is_multiple());
        assert_eq!(node.reference("type"), Some("type-patient"));
        assert!(node.last_modified().is_some());
        assert!(node.property("notes").is_none());
    }

    #[test]
    fn test_property_order_is_preserved() {
        let repo = load_fixture_str(FIXTURE).unwrap();
        let session = repo.open_session().unwrap();
        let node = session
            .node(&NodePath::new("/Subjects/s1").unwrap())
            .unwrap()
            .unwrap();
        let names: Vec<_> = node.property_names().collect();
        assert_eq!(
            names,
            vec!["identifier", "age", "score", "active", "tags", "jcr:lastModified", "type"]
        );
    }

    #[test]
    fn test_malformed_fixture() {
        assert!(load_fixture_str("{ not json").is_err());
        assert!(load_fixture_str(r#"{"children": [{"name": "a/b"}]}"#).is_err());
        assert!(load_fixture_str(
            r#"{"children": [{"name": "a", "properties": {"d": {"type": "date", "value": "yesterday"}}}]}"#
        )
        .is_err());
    }

    #[test]
    fn test_load_fixture_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("content.json");
        std::fs::write(&path, FIXTURE).unwrap();
        let repo = load_fixture_file(&path).unwrap();
        assert_eq!(repo.len(), 3);
        assert!(load_fixture_file(dir.path().join("missing.json")).is_err());
    }
}
