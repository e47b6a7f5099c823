//! Recursive child serialization

use crate::core::serialize::engine::SerializationContext;
use crate::core::serialize::processor::JsonProcessor;
use crate::domain::Node;
use serde_json::Value;

/// Serializes children recursively; selected with `.deep`
pub struct DeepProcessor;

impl JsonProcessor for DeepProcessor {
    fn name(&self) -> &str {
        "deep"
    }

    fn priority(&self) -> i32 {
        0
    }

    fn process_child(
        &self,
        _node: &Node,
        child: &Node,
        input: Option<Value>,
        context: &SerializationContext<'_>,
    ) -> Option<Value> {
        if input.is_some() {
            return input;
        }
        Some(context.serialize(child))
    }
}
