//! Ordered JSON object accumulator
//!
//! Processors contribute to a node's JSON through a [`JsonAccumulator`]:
//! keys keep the position of their first insertion and later writes to the
//! same key win. The accumulator is finalized once into an immutable
//! [`serde_json::Value`].

use serde_json::{Map, Value};

/// Ordered key/value accumulator for one serialized node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonAccumulator {
    entries: Map<String, Value>,
}

impl JsonAccumulator {
    /// Creates an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a key; an existing key keeps its position and takes the new value
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Removes a key, keeping the order of the remaining entries
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if !self.entries.contains_key(key) {
            return None;
        }
        let mut removed = None;
        self.entries = std::mem::take(&mut self.entries)
            .into_iter()
            .filter_map(|(k, v)| {
                if k == key {
                    removed = Some(v);
                    None
                } else {
                    Some((k, v))
                }
            })
            .collect();
        removed
    }

    /// Value currently stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Whether `key` has a value
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies every non-null entry of `object`, later writes winning
    pub fn merge_non_null(&mut self, object: &Map<String, Value>) {
        for (key, value) in object {
            if !value.is_null() {
                self.entries.insert(key.clone(), value.clone());
            }
        }
    }

    /// Finalizes the accumulator into a JSON object
    pub fn finish(self) -> Value {
        Value::Object(self.entries)
    }
}
