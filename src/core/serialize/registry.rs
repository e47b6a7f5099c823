//! Processor registry and selector resolution
//!
//! The registry is an explicit table built once at start-up and shared by
//! reference. Resolution turns a selector list into the ordered
//! [`ProcessorSelection`] used for one serialization call.

use super::processor::JsonProcessor;
use crate::domain::{Node, Result, StrataError};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Total order of processors: priority, then name
fn execution_order(a: &dyn JsonProcessor, b: &dyn JsonProcessor) -> Ordering {
    a.priority()
        .cmp(&b.priority())
        .then_with(|| a.name().cmp(b.name()))
}

/// Table of registered JSON processors, kept in execution order
#[derive(Default, Clone)]
pub struct ProcessorRegistry {
    processors: Vec<Arc<dyn JsonProcessor>>,
}

impl ProcessorRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a processor
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the name is already taken.
    pub fn register(&mut self, processor: Arc<dyn JsonProcessor>) -> Result<()> {
        if self.get(processor.name()).is_some() {
            return Err(StrataError::Configuration(format!(
                "JSON processor '{}' is already registered",
                processor.name()
            )));
        }
        let idx = self
            .processors
            .partition_point(|p| execution_order(p.as_ref(), processor.as_ref()) == Ordering::Less);
        self.processors.insert(idx, processor);
        Ok(())
    }

    /// Looks a processor up by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn JsonProcessor>> {
        self.processors.iter().find(|p| p.name() == name)
    }

    /// All processors in execution order
    pub fn processors(&self) -> &[Arc<dyn JsonProcessor>] {
        &self.processors
    }

    /// Number of registered processors
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether no processor is registered
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Resolves the processors active for a serialization rooted at `root`
    ///
    /// Explicit selectors beat defaults: `name` forces a processor on and
    /// `-name` forces it off, the later token winning when both appear. A
    /// `no<name>` token also switches `<name>` off unless `<name>` itself was
    /// requested. Everything else follows the processor's default policy.
    pub fn resolve<S: AsRef<str>>(&self, root: &Node, selectors: &[S]) -> ProcessorSelection {
        let mut explicit: HashMap<&str, bool> = HashMap::new();
        for token in selectors {
            let token = token.as_ref();
            match token.strip_prefix('-') {
                Some(name) => explicit.insert(name, false),
                None => explicit.insert(token, true),
            };
        }

        let negated: HashSet<&str> = explicit
            .iter()
            .filter(|(_, enabled)| **enabled)
            .filter_map(|(name, _)| name.strip_prefix("no"))
            .filter(|target| !target.is_empty() && self.get(target).is_some())
            .collect();

        let processors = self
            .processors
            .iter()
            .filter(|p| match explicit.get(p.name()) {
                Some(enabled) => *enabled,
                None => !negated.contains(p.name()) && p.is_enabled_by_default(root),
            })
            .filter(|p| p.can_process(root))
            .cloned()
            .collect();

        ProcessorSelection { processors }
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.processors.iter().map(|p| (p.name(), p.priority())))
            .finish()
    }
}

/// Ordered processors active for one serialization call
#[derive(Clone, Default)]
pub struct ProcessorSelection {
    processors: Vec<Arc<dyn JsonProcessor>>,
}

impl ProcessorSelection {
    /// Active processors in execution order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn JsonProcessor>> {
        self.processors.iter()
    }

    /// Names of the active processors in execution order
    pub fn names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Whether the named processor is active
    pub fn contains(&self, name: &str) -> bool {
        self.processors.iter().any(|p| p.name() == name)
    }

    /// Number of active processors
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether no processor is active
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl std::fmt::Debug for ProcessorSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
