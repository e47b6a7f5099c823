//! Progeny closure over the subject type hierarchy
//!
//! A type node's progeny are the type nodes whose `parent` reference points
//! at it, recursively. The closure is computed with one visited set per call,
//! shared across siblings, so a type reachable through two branches is
//! expanded once and cycles terminate.

use crate::adapters::repository::{NodeQuery, Predicate};
use crate::core::serialize::accumulator::JsonAccumulator;
use crate::core::serialize::engine::SerializationContext;
use crate::core::serialize::processor::JsonProcessor;
use crate::domain::{node_types, property_names, Node, NodePath, Result};
use serde_json::Value;
use std::collections::HashSet;

const PROGENY_KEY: &str = "@progeny";

/// Paths visited during one closure computation
pub type SeenSet = HashSet<NodePath>;

/// Adds the `@progeny` tree to the serialized root; selected with `.progeny`
pub struct ProgenyProcessor {
    node_type: String,
    parent_property: String,
}

impl Default for ProgenyProcessor {
    fn default() -> Self {
        Self::new(node_types::SUBJECT_TYPE, property_names::PARENT)
    }
}

impl ProgenyProcessor {
    /// Creates a processor over `node_type` nodes linked by `parent_property`
    pub fn new(node_type: &str, parent_property: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            parent_property: parent_property.to_string(),
        }
    }

    /// Computes the closure below `node`
    ///
    /// The root of the closure only carries `@progeny`; every other node also
    /// carries its own properties, rendered by an independent default
    /// serialization.
    fn closure(
        &self,
        node: &Node,
        seen: &mut SeenSet,
        is_root: bool,
        context: &SerializationContext<'_>,
    ) -> Result<JsonAccumulator> {
        let query = NodeQuery::select(&self.node_type)
            .filter(Predicate::equals(&self.parent_property, node.identifier.clone()));
        let children = context.session().find(&query)?;
        let has_children = !children.is_empty();

        let mut progeny = Vec::new();
        for child in children {
            if !seen.insert(child.path.clone()) {
                tracing::trace!(path = %child.path, "Progeny already visited");
                continue;
            }
            match self.closure(&child, seen, false, context) {
                Ok(descendant) => progeny.push(descendant.finish()),
                Err(e) => tracing::warn!(
                    path = %child.path,
                    error = %e,
                    "Cannot compute progeny, skipping branch"
                ),
            }
        }

        let mut json = JsonAccumulator::new();
        // present whenever the query matched, even if every match was seen
        if is_root || has_children {
            json.insert(PROGENY_KEY, Value::Array(progeny));
        }
        if !is_root {
            if let Value::Object(own) = context.serialize_standalone(node) {
                json.merge_non_null(&own);
            }
        }
        Ok(json)
    }
}

impl JsonProcessor for ProgenyProcessor {
    fn name(&self) -> &str {
        "progeny"
    }

    fn priority(&self) -> i32 {
        11
    }

    fn leave(&self, node: &Node, json: &mut JsonAccumulator, context: &SerializationContext<'_>) {
        if !context.is_root(node) {
            return;
        }
        let mut seen = SeenSet::new();
        seen.insert(node.path.clone());
        match self.closure(node, &mut seen, true, context) {
            Ok(mut closure) => {
                if let Some(progeny) = closure.remove(PROGENY_KEY) {
                    json.insert(PROGENY_KEY, progeny);
                }
            }
            Err(e) => tracing::warn!(path = %node.path, error = %e, "Cannot compute progeny"),
        }
    }
}
