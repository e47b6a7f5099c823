//! Structured node queries
//!
//! [`NodeQuery`] is the query model repositories execute: select nodes of one
//! primary type, filter them by property predicates, optionally follow a
//! reference property to nodes of another type (an inner join), and order the
//! result. Predicate evaluation lives here so every repository applies the
//! same semantics, in particular the half-open timestamp range.

use crate::domain::{Node, Value};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// A property predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Some value of the property equals `value`
    Equals { property: String, value: String },
    /// No value of the property equals `value`; absent properties match
    NotEquals { property: String, value: String },
    /// The date property is at or after `instant`
    AtLeast {
        property: String,
        instant: DateTime<Utc>,
    },
    /// The date property is strictly before `instant`
    Before {
        property: String,
        instant: DateTime<Utc>,
    },
    /// The reference property points at one of `targets`
    ReferencesAny {
        property: String,
        targets: Vec<String>,
    },
}

impl Predicate {
    /// Some value of `property` equals `value`
    pub fn equals(property: &str, value: impl Into<String>) -> Self {
        Predicate::Equals {
            property: property.to_string(),
            value: value.into(),
        }
    }

    /// No value of `property` equals `value`
    pub fn not_equals(property: &str, value: impl Into<String>) -> Self {
        Predicate::NotEquals {
            property: property.to_string(),
            value: value.into(),
        }
    }

    /// `property` is at or after `instant`
    pub fn at_least(property: &str, instant: DateTime<Utc>) -> Self {
        Predicate::AtLeast {
            property: property.to_string(),
            instant,
        }
    }

    /// `property` is strictly before `instant`
    pub fn before(property: &str, instant: DateTime<Utc>) -> Self {
        Predicate::Before {
            property: property.to_string(),
            instant,
        }
    }

    /// `property` references one of `targets`
    pub fn references_any(property: &str, targets: Vec<String>) -> Self {
        Predicate::ReferencesAny {
            property: property.to_string(),
            targets,
        }
    }

    /// Evaluates the predicate against a node
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Predicate::Equals { property, value } => string_values(node, property)
                .iter()
                .any(|v| v == value),
            Predicate::NotEquals { property, value } => !string_values(node, property)
                .iter()
                .any(|v| v == value),
            Predicate::AtLeast { property, instant } => {
                date_value(node, property).is_some_and(|d| d >= *instant)
            }
            Predicate::Before { property, instant } => {
                date_value(node, property).is_some_and(|d| d < *instant)
            }
            Predicate::ReferencesAny { property, targets } => node
                .reference(property)
                .is_some_and(|id| targets.iter().any(|t| t == id)),
        }
    }
}

fn string_values(node: &Node, property: &str) -> Vec<String> {
    node.property(property)
        .map(|p| p.values().into_iter().map(Value::as_query_string).collect())
        .unwrap_or_default()
}

fn date_value(node: &Node, property: &str) -> Option<DateTime<Utc>> {
    node.property(property)
        .and_then(|p| p.first())
        .and_then(Value::as_instant)
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = |i: &DateTime<Utc>| i.to_rfc3339_opts(SecondsFormat::Millis, true);
        match self {
            Predicate::Equals { property, value } => write!(f, "n.[{property}] = '{value}'"),
            Predicate::NotEquals { property, value } => {
                write!(f, "NOT n.[{property}] = '{value}'")
            }
            Predicate::AtLeast { property, instant } => {
                write!(f, "n.[{property}] >= '{}'", ts(instant))
            }
            Predicate::Before { property, instant } => {
                write!(f, "n.[{property}] < '{}'", ts(instant))
            }
            Predicate::ReferencesAny { property, targets } => {
                write!(f, "n.[{property}] IN ('{}')", targets.join("', '"))
            }
        }
    }
}

/// Inner join from the selected nodes to the nodes a reference points at
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub reference_property: String,
    pub target_type: String,
}

/// A query over typed nodes
#[derive(Debug, Clone, PartialEq)]
pub struct NodeQuery {
    pub node_type: String,
    pub predicates: Vec<Predicate>,
    pub join: Option<Join>,
    pub order_by: Option<String>,
}

impl NodeQuery {
    /// Selects all nodes of a primary type
    pub fn select(node_type: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            predicates: Vec::new(),
            join: None,
            order_by: None,
        }
    }

    /// Adds a predicate; all predicates must hold
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Returns the distinct targets of `reference_property` instead of the
    /// selected nodes, keeping only targets of `target_type`
    pub fn join(mut self, reference_property: &str, target_type: &str) -> Self {
        self.join = Some(Join {
            reference_property: reference_property.to_string(),
            target_type: target_type.to_string(),
        });
        self
    }

    /// Orders results by `property`, ascending
    pub fn order_by(mut self, property: &str) -> Self {
        self.order_by = Some(property.to_string());
        self
    }

    /// Whether a node satisfies the type and every predicate
    pub fn matches(&self, node: &Node) -> bool {
        node.is_type(&self.node_type) && self.predicates.iter().all(|p| p.matches(node))
    }
}

impl fmt::Display for NodeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.join {
            Some(join) => write!(
                f,
                "SELECT t.* FROM [{}] AS n INNER JOIN [{}] AS t ON n.[{}] = t.[jcr:uuid]",
                self.node_type, join.target_type, join.reference_property
            )?,
            None => write!(f, "SELECT n.* FROM [{}] AS n", self.node_type)?,
        }
        for (i, predicate) in self.predicates.iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            write!(f, " {keyword} {predicate}")?;
        }
        if let Some(order) = &self.order_by {
            write!(f, " ORDER BY n.[{order}]")?;
        }
        Ok(())
    }
}
