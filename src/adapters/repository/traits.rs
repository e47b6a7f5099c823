//! Content repository abstraction traits
//!
//! This module defines the traits a content store must implement to be
//! serialized and exported by Strata.

use super::query::NodeQuery;
use crate::domain::path_info::candidate_splits;
use crate::domain::{Node, NodePath, PathInfo, Property, RepositoryError, Result};

/// A hierarchical content store
///
/// Access goes through sessions. A session is acquired at the start of a
/// stage call and released when dropped, on every exit path.
pub trait ContentRepository: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Opens a session; the session is released when dropped
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot hand out a session.
    fn open_session(&self) -> Result<Box<dyn RepositorySession + '_>>;
}

/// A node resolved from a path with selector and filter suffixes
#[derive(Debug, Clone)]
pub struct Resolution {
    pub node: Node,
    pub path_info: PathInfo,
}

/// Read access to the content tree for the lifetime of one stage call
pub trait RepositorySession: Send + Sync {
    /// Node at an absolute path
    fn node(&self, path: &NodePath) -> Result<Option<Node>>;

    /// Node carrying the given identifier
    fn node_by_identifier(&self, identifier: &str) -> Result<Option<Node>>;

    /// Children of a node in store order
    ///
    /// # Errors
    ///
    /// Returns an error if the children cannot be listed.
    fn children(&self, path: &NodePath) -> Result<Vec<Node>>;

    /// Reads one property of a node
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::PropertyUnreadable`] when the value exists
    /// but cannot be read.
    fn read_property(&self, node: &Node, name: &str) -> Result<Property>;

    /// Executes a query
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::QueryFailed`] when the query cannot run.
    fn find(&self, query: &NodeQuery) -> Result<Vec<Node>>;

    /// Resolves `<path><suffixes>`; the longest existing node path wins and
    /// the remaining dot-separated tokens become the path info
    fn resolve(&self, raw: &str) -> Result<Option<Resolution>> {
        for (path, info) in candidate_splits(raw) {
            let Ok(path) = NodePath::new(path) else {
                continue;
            };
            if let Some(node) = self.node(&path)? {
                return Ok(Some(Resolution {
                    node,
                    path_info: PathInfo::parse(&info),
                }));
            }
        }
        Ok(None)
    }

    /// Like [`RepositorySession::node`] but fails when nothing exists
    fn require_node(&self, path: &NodePath) -> Result<Node> {
        self.node(path)?
            .ok_or_else(|| RepositoryError::NodeNotFound(path.to_string()).into())
    }
}
