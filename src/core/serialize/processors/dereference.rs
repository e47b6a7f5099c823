//! Reference and path dereferencing

use crate::core::serialize::engine::SerializationContext;
use crate::core::serialize::processor::JsonProcessor;
use crate::domain::{Node, NodePath, Property, PropertyValue, Value};
use serde_json::Value as JsonValue;

/// Replaces reference and path properties with the node they point at
///
/// Properties in the `jcr:` namespace are rendered as the target path rather
/// than the serialized target. Unresolvable references keep the value
/// produced by earlier processors; unresolvable paths keep the raw path.
pub struct DereferenceProcessor;

impl JsonProcessor for DereferenceProcessor {
    fn name(&self) -> &str {
        "dereference"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn is_enabled_by_default(&self, _root: &Node) -> bool {
        true
    }

    fn process_property(
        &self,
        node: &Node,
        property: &Property,
        input: Option<JsonValue>,
        context: &SerializationContext<'_>,
    ) -> Option<JsonValue> {
        let is_link = |v: &Value| matches!(v, Value::Reference(_) | Value::Path(_));
        match &property.value {
            PropertyValue::Single(value) if is_link(value) => {
                self.dereference(node, &property.name, value, context).or(input)
            }
            PropertyValue::Multiple(values) if !values.is_empty() && values.iter().all(is_link) => {
                let mut rendered = Vec::with_capacity(values.len());
                for value in values {
                    match (self.dereference(node, &property.name, value, context), value) {
                        (Some(json), _) => rendered.push(json),
                        (None, Value::Path(path)) => rendered.push(JsonValue::String(path.clone())),
                        (None, _) => return input,
                    }
                }
                Some(JsonValue::Array(rendered))
            }
            _ => input,
        }
    }
}

impl DereferenceProcessor {
    fn dereference(
        &self,
        node: &Node,
        property: &str,
        value: &Value,
        context: &SerializationContext<'_>,
    ) -> Option<JsonValue> {
        let lookup = match value {
            Value::Reference(id) => context.session().node_by_identifier(id),
            Value::Path(path) => match resolve_relative(&node.path, path) {
                Some(target) => context.session().node(&target),
                None => return None,
            },
            _ => return None,
        };
        let target = match lookup {
            Ok(Some(target)) => target,
            Ok(None) => {
                tracing::debug!(path = %node.path, property = %property, "Dangling reference");
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    path = %node.path,
                    property = %property,
                    error = %e,
                    "Cannot dereference property"
                );
                return None;
            }
        };
        if property.starts_with("jcr:") {
            Some(JsonValue::String(target.path.to_string()))
        } else {
            Some(context.serialize(&target))
        }
    }
}

/// Resolves an absolute path, or a path relative to `base`
pub fn resolve_relative(base: &NodePath, path: &str) -> Option<NodePath> {
    if path.starts_with('/') {
        return NodePath::new(path).ok();
    }
    let mut current = base.clone();
    for segment in path.split('/') {
        current = match segment {
            "" | "." => current,
            ".." => current.parent()?,
            name => current.join(name).ok()?,
        };
    }
    Some(current)
}
