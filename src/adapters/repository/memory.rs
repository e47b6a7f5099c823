//! In-memory content repository
//!
//! Holds a snapshot of a content tree, typically loaded from a JSON fixture
//! (see [`super::fixture`]). Queries are evaluated with the shared predicate
//! semantics of [`super::query`]. The repository counts open sessions and can
//! be told to fail reads, which the export tests rely on.

use super::query::NodeQuery;
use super::traits::{ContentRepository, RepositorySession};
use crate::domain::{Node, NodePath, Property, RepositoryError, Result, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

const ROOT_TYPE: &str = "rep:root";

/// Snapshot content store kept in memory
#[derive(Debug)]
pub struct MemoryRepository {
    nodes: HashMap<NodePath, Node>,
    /// Paths in document order
    order: Vec<NodePath>,
    children: HashMap<NodePath, Vec<NodePath>>,
    by_identifier: HashMap<String, NodePath>,
    unreadable_properties: HashSet<(NodePath, String)>,
    unlistable: HashSet<NodePath>,
    queries_fail: AtomicBool,
    open_sessions: AtomicUsize,
}

impl MemoryRepository {
    /// Starts an empty repository builder
    pub fn builder() -> MemoryRepositoryBuilder {
        MemoryRepositoryBuilder::default()
    }

    /// Number of sessions currently open
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(AtomicOrdering::SeqCst)
    }

    /// Makes every subsequent query fail until reset
    pub fn set_queries_fail(&self, fail: bool) {
        self.queries_fail.store(fail, AtomicOrdering::SeqCst);
    }

    /// Number of stored nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the repository holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn run_query(&self, query: &NodeQuery) -> Result<Vec<Node>> {
        if self.queries_fail.load(AtomicOrdering::SeqCst) {
            return Err(RepositoryError::QueryFailed(format!(
                "query rejected by repository: {query}"
            ))
            .into());
        }

        let mut matches: Vec<&Node> = self
            .order
            .iter()
            .filter_map(|path| self.nodes.get(path))
            .filter(|node| query.matches(node))
            .collect();

        if let Some(property) = &query.order_by {
            matches.sort_by(|a, b| compare_property(a, b, property));
        }

        let Some(join) = &query.join else {
            return Ok(matches.into_iter().cloned().collect());
        };

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for node in matches {
            let Some(target) = node
                .reference(&join.reference_property)
                .and_then(|id| self.by_identifier.get(id))
                .and_then(|path| self.nodes.get(path))
            else {
                continue;
            };
            if target.is_type(&join.target_type) && seen.insert(target.path.clone()) {
                targets.push(target.clone());
            }
        }
        Ok(targets)
    }
}

fn compare_property(a: &Node, b: &Node, property: &str) -> Ordering {
    let key = |n: &Node| n.property(property).and_then(|p| p.first()).cloned();
    match (key(a), key(b)) {
        (Some(Value::Date(x)), Some(Value::Date(y))) => x.cmp(&y),
        (Some(Value::Long(x)), Some(Value::Long(y))) => x.cmp(&y),
        (Some(x), Some(y)) => x.as_query_string().cmp(&y.as_query_string()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl ContentRepository for MemoryRepository {
    fn name(&self) -> &str {
        "memory"
    }

    fn open_session(&self) -> Result<Box<dyn RepositorySession + '_>> {
        self.open_sessions.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(Box::new(MemorySession { repository: self }))
    }
}

/// Session over a [`MemoryRepository`]; decrements the open count on drop
struct MemorySession<'a> {
    repository: &'a MemoryRepository,
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        self.repository
            .open_sessions
            .fetch_sub(1, AtomicOrdering::SeqCst);
    }
}

impl RepositorySession for MemorySession<'_> {
    fn node(&self, path: &NodePath) -> Result<Option<Node>> {
        Ok(self.repository.nodes.get(path).cloned())
    }

    fn node_by_identifier(&self, identifier: &str) -> Result<Option<Node>> {
        Ok(self
            .repository
            .by_identifier
            .get(identifier)
            .and_then(|path| self.repository.nodes.get(path))
            .cloned())
    }

    fn children(&self, path: &NodePath) -> Result<Vec<Node>> {
        if self.repository.unlistable.contains(path) {
            return Err(RepositoryError::QueryFailed(format!(
                "children of {path} cannot be listed"
            ))
            .into());
        }
        Ok(self
            .repository
            .children
            .get(path)
            .map(|paths| {
                paths
                    .iter()
                    .filter_map(|p| self.repository.nodes.get(p))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn read_property(&self, node: &Node, name: &str) -> Result<Property> {
        if self
            .repository
            .unreadable_properties
            .contains(&(node.path.clone(), name.to_string()))
        {
            return Err(RepositoryError::PropertyUnreadable {
                path: node.path.to_string(),
                property: name.to_string(),
                reason: "value cannot be decoded".to_string(),
            }
            .into());
        }
        node.property(name).cloned().ok_or_else(|| {
            RepositoryError::PropertyUnreadable {
                path: node.path.to_string(),
                property: name.to_string(),
                reason: "no such property".to_string(),
            }
            .into()
        })
    }

    fn find(&self, query: &NodeQuery) -> Result<Vec<Node>> {
        tracing::trace!(query = %query, "Executing query");
        self.repository.run_query(query)
    }
}

/// Builder for [`MemoryRepository`]
#[derive(Debug, Default)]
pub struct MemoryRepositoryBuilder {
    nodes: Vec<Node>,
    unreadable_properties: HashSet<(NodePath, String)>,
    unlistable: HashSet<NodePath>,
}

impl MemoryRepositoryBuilder {
    /// Adds a node; parents must be added before their children
    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Makes a property fail to read
    pub fn unreadable_property(mut self, path: &NodePath, name: &str) -> Self {
        self.unreadable_properties
            .insert((path.clone(), name.to_string()));
        self
    }

    /// Makes listing the children of a node fail
    pub fn unlistable(mut self, path: &NodePath) -> Self {
        self.unlistable.insert(path.clone());
        self
    }

    /// Builds the repository
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::InvalidFixture`] for duplicate paths or
    /// identifiers and for nodes whose parent is missing.
    pub fn build(self) -> Result<MemoryRepository> {
        let root = Node {
            path: NodePath::root(),
            identifier: "root".to_string(),
            primary_type: ROOT_TYPE.to_string(),
            properties: Vec::new(),
        };

        let mut repository = MemoryRepository {
            nodes: HashMap::new(),
            order: Vec::new(),
            children: HashMap::new(),
            by_identifier: HashMap::new(),
            unreadable_properties: self.unreadable_properties,
            unlistable: self.unlistable,
            queries_fail: AtomicBool::new(false),
            open_sessions: AtomicUsize::new(0),
        };

        let nodes = std::iter::once(root).chain(
            self.nodes
                .into_iter()
                .filter(|node| !node.path.is_root()),
        );
        for node in nodes {
            if repository.nodes.contains_key(&node.path) {
                return Err(RepositoryError::InvalidFixture(format!(
                    "duplicate node path {}",
                    node.path
                ))
                .into());
            }
            if let Some(existing) = repository.by_identifier.get(&node.identifier) {
                return Err(RepositoryError::InvalidFixture(format!(
                    "identifier {} used by both {} and {}",
                    node.identifier, existing, node.path
                ))
                .into());
            }
            if let Some(parent) = node.path.parent() {
                if !repository.nodes.contains_key(&parent) {
                    return Err(RepositoryError::InvalidFixture(format!(
                        "parent {parent} of {} does not exist",
                        node.path
                    ))
                    .into());
                }
                repository
                    .children
                    .entry(parent)
                    .or_default()
                    .push(node.path.clone());
            }
            repository
                .by_identifier
                .insert(node.identifier.clone(), node.path.clone());
            repository.order.push(node.path.clone());
            repository.nodes.insert(node.path.clone(), node);
        }

        Ok(repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::repository::query::Predicate;
    use crate::domain::node::NodeBuilder;

    fn repository() -> MemoryRepository {
        MemoryRepository::builder()
            .node(NodeBuilder::new("/Subjects", "cards:SubjectsHomepage").build().unwrap())
            .node(
                NodeBuilder::new("/Subjects/b", "cards:Subject")
                    .identifier("subject-b")
                    .string("identifier", "B")
                    .build()
                    .unwrap(),
            )
            .node(
                NodeBuilder::new("/Subjects/a", "cards:Subject")
                    .identifier("subject-a")
                    .string("identifier", "A")
                    .build()
                    .unwrap(),
            )
            .node(NodeBuilder::new("/Forms", "cards:FormsHomepage").build().unwrap())
            .node(
                NodeBuilder::new("/Forms/f1", "cards:Form")
                    .reference("subject", "subject-a")
                    .build()
                    .unwrap(),
            )
            .node(
                NodeBuilder::new("/Forms/f2", "cards:Form")
                    .reference("subject", "subject-a")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let repo = repository();
        let session = repo.open_session().unwrap();
        let children = session.children(&NodePath::new("/Subjects").unwrap()).unwrap();
        let names: Vec<_> = children.iter().map(|n| n.name().to_string()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_lookup_by_identifier() {
        let repo = repository();
        let session = repo.open_session().unwrap();
        let node = session.node_by_identifier("subject-a").unwrap().unwrap();
        assert_eq!(node.path.as_str(), "/Subjects/a");
        assert!(session.node_by_identifier("missing").unwrap().is_none());
    }

    #[test]
    fn test_join_deduplicates_targets() {
        let repo = repository();
        let session = repo.open_session().unwrap();
        let subjects = session
            .find(&NodeQuery::select("cards:Form").join("subject", "cards:Subject"))
            .unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].identifier, "subject-a");
    }

    #[test]
    fn test_order_by_property() {
        let repo = repository();
        let session = repo.open_session().unwrap();
        let subjects = session
            .find(&NodeQuery::select("cards:Subject").order_by("identifier"))
            .unwrap();
        assert_eq!(subjects[0].identifier, "subject-a");

        let filtered = session
            .find(&NodeQuery::select("cards:Subject").filter(Predicate::equals("identifier", "B")))
            .unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_session_release_is_counted() {
        let repo = repository();
        {
            let _first = repo.open_session().unwrap();
            let _second = repo.open_session().unwrap();
            assert_eq!(repo.open_sessions(), 2);
        }
        assert_eq!(repo.open_sessions(), 0);
    }

    #[test]
    fn test_query_failure_toggle() {
        let repo = repository();
        repo.set_queries_fail(true);
        let session = repo.open_session().unwrap();
        assert!(session.find(&NodeQuery::select("cards:Form")).is_err());
    }

    #[test]
    fn test_unreadable_property() {
        let path = NodePath::new("/Subjects/a").unwrap();
        let repo = MemoryRepository::builder()
            .node(NodeBuilder::new("/Subjects", "nt:folder").build().unwrap())
            .node(NodeBuilder::new("/Subjects/a", "cards:Subject").string("identifier", "A").build().unwrap())
            .unreadable_property(&path, "identifier")
            .build()
            .unwrap();
        let session = repo.open_session().unwrap();
        let node = session.node(&path).unwrap().unwrap();
        assert!(session.read_property(&node, "identifier").is_err());
    }

    #[test]
    fn test_resolve_with_suffixes() {
        let repo = repository();
        let session = repo.open_session().unwrap();
        let resolution = session.resolve("/Subjects/a.deep.-identify").unwrap().unwrap();
        assert_eq!(resolution.node.path.as_str(), "/Subjects/a");
        assert_eq!(resolution.path_info.selectors(), vec!["deep", "-identify"]);
        assert!(session.resolve("/Subjects/zzz.deep").unwrap().is_none());
    }

    #[test]
    fn test_build_rejects_orphans_and_duplicates() {
        let orphan = MemoryRepository::builder()
            .node(NodeBuilder::new("/a/b", "nt:unstructured").build().unwrap())
            .build();
        assert!(orphan.is_err());

        let duplicate = MemoryRepository::builder()
            .node(NodeBuilder::new("/a", "nt:unstructured").identifier("x").build().unwrap())
            .node(NodeBuilder::new("/b", "nt:unstructured").identifier("x").build().unwrap())
            .build();
        assert!(duplicate.is_err());
    }
}
