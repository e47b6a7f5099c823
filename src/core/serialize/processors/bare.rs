//! Repository bookkeeping removal

use crate::core::serialize::accumulator::JsonAccumulator;
use crate::core::serialize::engine::SerializationContext;
use crate::core::serialize::processor::JsonProcessor;
use crate::domain::node::format_date;
use crate::domain::{Node, Property};
use serde_json::Value;

/// Strips repository bookkeeping; selected with `.bare`
///
/// `jcr:` and `sling:` properties, the `form` back-reference and `jcr:`
/// children are dropped. The root keeps its timestamps as plain `created`
/// and `lastModified` entries.
pub struct BareProcessor;

impl JsonProcessor for BareProcessor {
    fn name(&self) -> &str {
        "bare"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn process_property(
        &self,
        _node: &Node,
        property: &Property,
        input: Option<Value>,
        _context: &SerializationContext<'_>,
    ) -> Option<Value> {
        let name = property.name.as_str();
        if name.starts_with("jcr:") || name.starts_with("sling:") || name == "form" {
            None
        } else {
            input
        }
    }

    fn process_child(
        &self,
        _node: &Node,
        child: &Node,
        input: Option<Value>,
        _context: &SerializationContext<'_>,
    ) -> Option<Value> {
        if child.name().starts_with("jcr:") {
            None
        } else {
            input
        }
    }

    fn leave(&self, node: &Node, json: &mut JsonAccumulator, context: &SerializationContext<'_>) {
        if context.depth() != 0 {
            return;
        }
        if let Some(created) = node.created() {
            json.insert("created", Value::String(format_date(&created)));
        }
        if let Some(modified) = node.last_modified() {
            json.insert("lastModified", Value::String(format_date(&modified)));
        }
    }
}
