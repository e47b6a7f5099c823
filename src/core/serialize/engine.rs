//! Serialization engine
//!
//! Turns a node into a JSON document by running the active processors over a
//! depth-first visit. A node already on the visit stack is rendered as its
//! path string, so reference and child cycles terminate. Failures reading a
//! single property or listing children are logged and the entry is omitted;
//! they never fail the document.

use super::accumulator::JsonAccumulator;
use super::registry::{ProcessorRegistry, ProcessorSelection};
use crate::adapters::repository::RepositorySession;
use crate::domain::{Node, NodePath, PathInfo, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::sync::Arc;

/// Serializes nodes with the processors of a registry
#[derive(Debug, Clone)]
pub struct SerializationEngine {
    registry: Arc<ProcessorRegistry>,
}

impl SerializationEngine {
    /// Creates an engine over a processor registry
    pub fn new(registry: Arc<ProcessorRegistry>) -> Self {
        Self { registry }
    }

    /// The registry processors are resolved from
    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    /// Serializes `node` with the processors selected by `path_info`
    pub fn serialize(
        &self,
        session: &dyn RepositorySession,
        node: &Node,
        path_info: &PathInfo,
    ) -> Value {
        serialize_resource(&self.registry, session, node, path_info)
    }

    /// Resolves `<path><selectors>` and serializes the resolved node
    ///
    /// Returns `Ok(None)` when no node exists at the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails while resolving the path.
    pub fn serialize_path(
        &self,
        session: &dyn RepositorySession,
        raw_path: &str,
    ) -> Result<Option<Value>> {
        let Some(resolution) = session.resolve(raw_path)? else {
            tracing::debug!(path = %raw_path, "Nothing to serialize at path");
            return Ok(None);
        };
        Ok(Some(self.serialize(
            session,
            &resolution.node,
            &resolution.path_info,
        )))
    }
}

fn serialize_resource(
    registry: &ProcessorRegistry,
    session: &dyn RepositorySession,
    node: &Node,
    path_info: &PathInfo,
) -> Value {
    let processors = registry.resolve(node, &path_info.selectors());
    tracing::debug!(
        path = %node.path,
        processors = ?processors.names(),
        "Serializing resource"
    );

    let context = SerializationContext {
        registry,
        session,
        processors,
        root: node,
        path_info,
        stack: RefCell::new(Vec::new()),
    };

    for processor in context.processors.iter() {
        processor.start(&context);
    }
    let json = context.serialize(node);
    for processor in context.processors.iter() {
        processor.end(&context);
    }
    json
}

/// State of one top-level serialization call, handed to every processor hook
pub struct SerializationContext<'a> {
    registry: &'a ProcessorRegistry,
    session: &'a dyn RepositorySession,
    processors: ProcessorSelection,
    root: &'a Node,
    path_info: &'a PathInfo,
    stack: RefCell<Vec<NodePath>>,
}

impl<'a> SerializationContext<'a> {
    /// Session the serialization reads from
    pub fn session(&self) -> &'a dyn RepositorySession {
        self.session
    }

    /// The node the serialization started from
    pub fn root(&self) -> &Node {
        self.root
    }

    /// Whether `node` is the top-level node being serialized
    pub fn is_root(&self, node: &Node) -> bool {
        node.path == self.root.path
    }

    /// Selectors and filters of the resolved path
    pub fn path_info(&self) -> &PathInfo {
        self.path_info
    }

    /// Processors active for this serialization
    pub fn processors(&self) -> &ProcessorSelection {
        &self.processors
    }

    /// Depth of the node currently visited, 0 for the root
    pub fn depth(&self) -> usize {
        self.stack.borrow().len().saturating_sub(1)
    }

    /// Serializes a node within this call, with the same processors
    pub fn serialize(&self, node: &Node) -> Value {
        let on_stack = self.stack.borrow().contains(&node.path);
        if on_stack {
            return Value::String(node.path.to_string());
        }
        self.stack.borrow_mut().push(node.path.clone());

        let mut json = JsonAccumulator::new();
        for processor in self.processors.iter() {
            processor.enter(node, &mut json, self);
        }
        self.serialize_properties(node, &mut json);
        self.serialize_children(node, &mut json);
        for processor in self.processors.iter() {
            processor.leave(node, &mut json, self);
        }

        self.stack.borrow_mut().pop();
        json.finish()
    }

    /// Serializes a node as an independent call with default processors
    pub fn serialize_standalone(&self, node: &Node) -> Value {
        serialize_resource(self.registry, self.session, node, &PathInfo::empty())
    }

    fn serialize_properties(&self, node: &Node, json: &mut JsonAccumulator) {
        for name in node.property_names() {
            let property = match self.session.read_property(node, name) {
                Ok(property) => property,
                Err(e) => {
                    tracing::warn!(
                        path = %node.path,
                        property = %name,
                        error = %e,
                        "Cannot read property, omitting it"
                    );
                    continue;
                }
            };
            let mut value = None;
            for processor in self.processors.iter() {
                value = processor.process_property(node, &property, value, self);
            }
            if let Some(value) = value {
                json.insert(property.name, value);
            }
        }
    }

    fn serialize_children(&self, node: &Node, json: &mut JsonAccumulator) {
        let children = match self.session.children(&node.path) {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!(
                    path = %node.path,
                    error = %e,
                    "Cannot list children, omitting them"
                );
                return;
            }
        };
        for child in children {
            let mut value = None;
            for processor in self.processors.iter() {
                value = processor.process_child(node, &child, value, self);
            }
            if let Some(value) = value {
                json.insert(child.name(), value);
            }
        }
    }
}
