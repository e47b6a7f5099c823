//! Path and name markers

use crate::core::serialize::accumulator::JsonAccumulator;
use crate::core::serialize::engine::SerializationContext;
use crate::core::serialize::processor::JsonProcessor;
use crate::domain::Node;
use serde_json::Value;

/// Adds `@path` and `@name` to every serialized node; enabled by default
pub struct IdentifyProcessor;

impl JsonProcessor for IdentifyProcessor {
    fn name(&self) -> &str {
        "identify"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn is_enabled_by_default(&self, _root: &Node) -> bool {
        true
    }

    fn leave(&self, node: &Node, json: &mut JsonAccumulator, _context: &SerializationContext<'_>) {
        json.insert("@path", Value::String(node.path.to_string()));
        json.insert("@name", Value::String(node.name().to_string()));
    }
}
