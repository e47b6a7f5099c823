//! Content tree nodes and typed property values

use crate::domain::ids::NodePath;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary node types the pipeline knows about
pub mod node_types {
    pub const SUBJECT: &str = "cards:Subject";
    pub const SUBJECT_TYPE: &str = "cards:SubjectType";
    pub const FORM: &str = "cards:Form";
    pub const QUESTIONNAIRE: &str = "cards:Questionnaire";
    pub const LINKS: &str = "cards:Links";
    pub const LINK: &str = "cards:Link";
    pub const FILE: &str = "nt:file";
    pub const RESOURCE: &str = "nt:resource";
}

/// Well-known property names
pub mod property_names {
    pub const CREATED: &str = "jcr:created";
    pub const CREATED_BY: &str = "jcr:createdBy";
    pub const LAST_MODIFIED: &str = "jcr:lastModified";
    pub const DATA: &str = "jcr:data";
    pub const MIME_TYPE: &str = "jcr:mimeType";
    pub const STATUS_FLAGS: &str = "statusFlags";
    pub const SUBJECT: &str = "subject";
    pub const QUESTIONNAIRE: &str = "questionnaire";
    pub const PARENT: &str = "parent";
    pub const IDENTIFIER: &str = "identifier";
    pub const TITLE: &str = "title";
}

/// A single typed property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    String(String),
    Boolean(bool),
    Long(i64),
    Double(f64),
    /// Arbitrary precision decimal kept in its textual form
    Decimal(String),
    Date(DateTime<FixedOffset>),
    /// Identifier of the referenced node
    Reference(String),
    /// Absolute or relative path to another node
    Path(String),
    Binary(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl Value {
    /// String form used by query predicates
    pub fn as_query_string(&self) -> String {
        match self {
            Value::String(s) | Value::Decimal(s) | Value::Reference(s) | Value::Path(s) => {
                s.clone()
            }
            Value::Boolean(b) => b.to_string(),
            Value::Long(n) => n.to_string(),
            Value::Double(n) => n.to_string(),
            Value::Date(d) => format_date(d),
            Value::Binary(bytes) => BASE64.encode(bytes),
        }
    }

    /// Instant of a date value
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(d.with_timezone(&Utc)),
            _ => None,
        }
    }
}

/// Formats a date the way the repository renders timestamps,
/// `yyyy-MM-ddTHH:mm:ss.SSS+hh:mm`
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

/// Formats an instant without losing precision
///
/// Whole milliseconds render like [`format_date`]; finer instants keep all
/// nine fractional digits.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    if instant.timestamp_subsec_nanos() % 1_000_000 == 0 {
        format_date(&instant.fixed_offset())
    } else {
        instant
            .fixed_offset()
            .format("%Y-%m-%dT%H:%M:%S%.9f%:z")
            .to_string()
    }
}

/// Value of a property, single or multi-valued
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Single(Value),
    Multiple(Vec<Value>),
}

/// A named property of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

impl Property {
    /// Creates a single-valued property
    pub fn single(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: PropertyValue::Single(value),
        }
    }

    /// Creates a multi-valued property
    pub fn multiple(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            value: PropertyValue::Multiple(values),
        }
    }

    /// Whether the property holds a list of values
    pub fn is_multiple(&self) -> bool {
        matches!(self.value, PropertyValue::Multiple(_))
    }

    /// The value of a single-valued property
    pub fn first(&self) -> Option<&Value> {
        match &self.value {
            PropertyValue::Single(v) => Some(v),
            PropertyValue::Multiple(values) => values.first(),
        }
    }

    /// All values, one element for single-valued properties
    pub fn values(&self) -> Vec<&Value> {
        match &self.value {
            PropertyValue::Single(v) => vec![v],
            PropertyValue::Multiple(values) => values.iter().collect(),
        }
    }
}

/// A typed node of the content tree
///
/// Nodes are snapshots handed out by a repository session; children are
/// listed through the session, not stored on the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub path: NodePath,
    pub identifier: String,
    pub primary_type: String,
    pub properties: Vec<Property>,
}

impl Node {
    /// Node name, the last path segment
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// Whether the node has the given primary type
    pub fn is_type(&self, node_type: &str) -> bool {
        self.primary_type == node_type
    }

    /// Looks a property up by name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Property names in store order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    /// String form of a single-valued property
    pub fn string(&self, name: &str) -> Option<String> {
        self.property(name)
            .and_then(Property::first)
            .map(Value::as_query_string)
    }

    /// Target identifier of a reference property
    pub fn reference(&self, name: &str) -> Option<&str> {
        match self.property(name).and_then(Property::first) {
            Some(Value::Reference(id)) => Some(id),
            _ => None,
        }
    }

    /// First date value of a property
    pub fn date(&self, name: &str) -> Option<DateTime<FixedOffset>> {
        match self.property(name).and_then(Property::first) {
            Some(Value::Date(d)) => Some(*d),
            _ => None,
        }
    }

    /// `jcr:lastModified`, if set
    pub fn last_modified(&self) -> Option<DateTime<FixedOffset>> {
        self.date(property_names::LAST_MODIFIED)
    }

    /// `jcr:created`, if set
    pub fn created(&self) -> Option<DateTime<FixedOffset>> {
        self.date(property_names::CREATED)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.path, self.primary_type)
    }
}

/// Builder for [`Node`]
///
/// # Examples
///
/// ```
/// use strata::domain::node::NodeBuilder;
///
/// let node = NodeBuilder::new("/Subjects/s1", "cards:Subject")
///     .identifier("subject-1")
///     .string("identifier", "P-0001")
///     .build()
///     .unwrap();
/// assert_eq!(node.string("identifier").as_deref(), Some("P-0001"));
/// ```
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    path: String,
    primary_type: String,
    identifier: Option<String>,
    properties: Vec<Property>,
}

impl NodeBuilder {
    /// Starts a node of `primary_type` at `path`
    pub fn new(path: impl Into<String>, primary_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            primary_type: primary_type.into(),
            identifier: None,
            properties: Vec::new(),
        }
    }

    /// Sets the identifier; a random UUID is used otherwise
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Adds or replaces a property
    pub fn property(mut self, property: Property) -> Self {
        match self.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
        self
    }

    /// Sets a single-valued property
    pub fn value(self, name: &str, value: Value) -> Self {
        self.property(Property::single(name, value))
    }

    /// Sets a multi-valued property
    pub fn values(self, name: &str, values: Vec<Value>) -> Self {
        self.property(Property::multiple(name, values))
    }

    /// Sets a string property
    pub fn string(self, name: &str, value: impl Into<String>) -> Self {
        self.value(name, Value::String(value.into()))
    }

    /// Sets a date property
    pub fn date(self, name: &str, value: DateTime<Utc>) -> Self {
        self.value(name, Value::Date(value.fixed_offset()))
    }

    /// Sets a reference to the node with `identifier`
    pub fn reference(self, name: &str, identifier: impl Into<String>) -> Self {
        self.value(name, Value::Reference(identifier.into()))
    }

    /// Sets a binary property
    pub fn binary(self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.value(name, Value::Binary(bytes.into()))
    }

    /// Builds the node, validating its path
    pub fn build(self) -> Result<Node, String> {
        Ok(Node {
            path: NodePath::new(self.path)?,
            identifier: self
                .identifier
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            primary_type: self.primary_type,
            properties: self.properties,
        })
    }
}

mod base64_bytes {
    use super::BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Writes bytes as base64
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    /// Reads base64 back into bytes
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}
