//! Link rendering and suppression

use crate::core::serialize::engine::SerializationContext;
use crate::core::serialize::processor::JsonProcessor;
use crate::domain::{node_types, Node};
use serde_json::{json, Value};

/// Renders `cards:Links` children as an array of link descriptors
pub struct LinksProcessor;

impl JsonProcessor for LinksProcessor {
    fn name(&self) -> &str {
        "links"
    }

    fn priority(&self) -> i32 {
        5
    }

    fn process_child(
        &self,
        _node: &Node,
        child: &Node,
        input: Option<Value>,
        context: &SerializationContext<'_>,
    ) -> Option<Value> {
        if !child.is_type(node_types::LINKS) {
            return input;
        }
        let links = match context.session().children(&child.path) {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(path = %child.path, error = %e, "Cannot list links");
                return input;
            }
        };
        let rendered = links
            .iter()
            .filter(|link| link.is_type(node_types::LINK))
            .map(|link| {
                let to = link
                    .reference("reference")
                    .and_then(|id| context.session().node_by_identifier(id).ok().flatten())
                    .map(|target| Value::String(target.path.to_string()))
                    .unwrap_or(Value::Null);
                json!({
                    "@name": link.name(),
                    "type": link.string("type"),
                    "label": link.string("label"),
                    "to": to,
                })
            })
            .collect();
        Some(Value::Array(rendered))
    }
}

/// Suppresses `cards:Links` children; runs after everything else
pub struct NoLinksProcessor;

impl JsonProcessor for NoLinksProcessor {
    fn name(&self) -> &str {
        "nolinks"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn process_child(
        &self,
        _node: &Node,
        child: &Node,
        input: Option<Value>,
        _context: &SerializationContext<'_>,
    ) -> Option<Value> {
        if child.is_type(node_types::LINKS) {
            None
        } else {
            input
        }
    }
}
