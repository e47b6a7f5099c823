//! JSON processor plugin interface

use super::accumulator::JsonAccumulator;
use super::engine::SerializationContext;
use crate::domain::{Node, Property};
use serde_json::Value;

/// A named, prioritized contributor to node serialization
///
/// Hooks run in selection order, lowest priority first. For every property
/// and child the engine threads the value produced so far through
/// [`JsonProcessor::process_property`] / [`JsonProcessor::process_child`]:
/// each processor receives the previous result (`None` before the first
/// producer) and returns the value to keep. Returning the input unchanged
/// leaves it alone, returning `None` omits the entry, so a processor running
/// later can override or suppress what an earlier one produced.
///
/// Processors must not hold per-call state in `self`; anything that lives for
/// one serialization belongs in locals or in the context.
pub trait JsonProcessor: Send + Sync {
    /// Unique name, also the selector token that enables the processor
    fn name(&self) -> &str;

    /// Lower priorities run first
    fn priority(&self) -> i32;

    /// Whether the processor applies to a serialization rooted at `root`
    fn can_process(&self, _root: &Node) -> bool {
        true
    }

    /// Whether the processor is active when no selector mentions it
    fn is_enabled_by_default(&self, _root: &Node) -> bool {
        false
    }

    /// Called once before the root is visited
    fn start(&self, _context: &SerializationContext<'_>) {}

    /// Called when a node is entered, before its properties
    fn enter(&self, _node: &Node, _json: &mut JsonAccumulator, _context: &SerializationContext<'_>) {}

    /// Computes the rendered value of one property
    fn process_property(
        &self,
        _node: &Node,
        _property: &Property,
        input: Option<Value>,
        _context: &SerializationContext<'_>,
    ) -> Option<Value> {
        input
    }

    /// Computes the rendered form of one child
    fn process_child(
        &self,
        _node: &Node,
        _child: &Node,
        input: Option<Value>,
        _context: &SerializationContext<'_>,
    ) -> Option<Value> {
        input
    }

    /// Called when a node is left, after its children
    fn leave(&self, _node: &Node, _json: &mut JsonAccumulator, _context: &SerializationContext<'_>) {}

    /// Called once after the root has been left
    fn end(&self, _context: &SerializationContext<'_>) {}
}
