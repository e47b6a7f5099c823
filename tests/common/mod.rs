//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use strata::adapters::repository::MemoryRepository;
use strata::config::ExportConfigDefinition;
use strata::core::export::{DataRetriever, DataStore, ExportCoordinator, StageRegistry};
use strata::core::serialize::{builtin_registry, SerializationEngine};
use strata::domain::node::NodeBuilder;
use strata::domain::{
    node_types, property_names, ExportName, Node, ResourceIdentifier, Result, StrataError,
    TimeWindow, Value,
};

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

/// `[2024-05-<from>, 2024-05-<to>)`
pub fn window(from: u32, to: u32) -> TimeWindow {
    TimeWindow::new(at(from, 0), Some(at(to, 0))).unwrap()
}

fn node(builder: NodeBuilder) -> Node {
    builder.build().unwrap()
}

fn form(
    name: &str,
    subject: &str,
    questionnaire: &str,
    modified: DateTime<Utc>,
    status: Option<&str>,
) -> NodeBuilder {
    let mut builder = NodeBuilder::new(format!("/Forms/{name}"), node_types::FORM)
        .identifier(format!("form-{name}"))
        .reference(property_names::SUBJECT, subject)
        .reference(property_names::QUESTIONNAIRE, questionnaire)
        .date(property_names::CREATED, modified)
        .date(property_names::LAST_MODIFIED, modified);
    if let Some(status) = status {
        builder = builder.values(
            property_names::STATUS_FLAGS,
            vec![Value::String(status.to_string())],
        );
    }
    builder
}

/// A small clinical content tree
///
/// | form | subject | questionnaire | modified         | status     |
/// |------|---------|---------------|------------------|------------|
/// | f1   | s1      | Visit         | 2024-05-09 08:00 | SUBMITTED  |
/// | f2   | s2      | Survey        | 2024-05-09 12:00 | INCOMPLETE |
/// | f3   | s2      | Visit         | 2024-05-08 10:00 |            |
/// | f4   | s3      | Survey        | 2024-05-10 00:00 |            |
/// | f5   | s1      | Visit         | 2024-05-01 09:00 |            |
pub fn clinical_builder() -> strata::adapters::repository::MemoryRepositoryBuilder {
    MemoryRepository::builder()
        .node(node(NodeBuilder::new("/Questionnaires", "cards:QuestionnairesHomepage")))
        .node(node(
            NodeBuilder::new("/Questionnaires/Visit", node_types::QUESTIONNAIRE)
                .identifier("q-visit")
                .string(property_names::TITLE, "Visit"),
        ))
        .node(node(
            NodeBuilder::new("/Questionnaires/Visit/weight", "cards:Question")
                .identifier("q-visit-weight")
                .string("text", "Weight"),
        ))
        .node(node(
            NodeBuilder::new("/Questionnaires/Survey", node_types::QUESTIONNAIRE)
                .identifier("q-survey")
                .string(property_names::TITLE, "Survey"),
        ))
        .node(node(NodeBuilder::new("/SubjectTypes", "cards:SubjectTypesHomepage")))
        .node(node(
            NodeBuilder::new("/SubjectTypes/Patient", node_types::SUBJECT_TYPE)
                .identifier("type-patient")
                .string("label", "Patient"),
        ))
        .node(node(NodeBuilder::new("/Subjects", "cards:SubjectsHomepage")))
        .node(node(
            NodeBuilder::new("/Subjects/s1", node_types::SUBJECT)
                .identifier("subject-1")
                .string(property_names::IDENTIFIER, "P-0001")
                .reference("type", "type-patient")
                .date(property_names::LAST_MODIFIED, at(1, 9)),
        ))
        .node(node(NodeBuilder::new("/Subjects/s1/links", node_types::LINKS)))
        .node(node(
            NodeBuilder::new("/Subjects/s1/links/sibling", node_types::LINK)
                .reference("reference", "subject-2")
                .string("type", "sibling")
                .string("label", "Brother"),
        ))
        .node(node(
            NodeBuilder::new("/Subjects/s2", node_types::SUBJECT)
                .identifier("subject-2")
                .string(property_names::IDENTIFIER, "P-0002"),
        ))
        .node(node(
            NodeBuilder::new("/Subjects/s3", node_types::SUBJECT)
                .identifier("subject-3")
                .string(property_names::IDENTIFIER, "P-0003"),
        ))
        .node(node(NodeBuilder::new("/Forms", "cards:FormsHomepage")))
        .node(node(form("f1", "subject-1", "q-visit", at(9, 8), Some("SUBMITTED"))))
        .node(node(
            NodeBuilder::new("/Forms/f1/weight", "cards:DecimalAnswer")
                .identifier("answer-1")
                .reference("question", "q-visit-weight")
                .value("value", Value::Double(71.5)),
        ))
        .node(node(form("f2", "subject-2", "q-survey", at(9, 12), Some("INCOMPLETE"))))
        .node(node(form("f3", "subject-2", "q-visit", at(8, 10), None)))
        .node(node(form("f4", "subject-3", "q-survey", at(10, 0), None)))
        .node(node(form("f5", "subject-1", "q-visit", at(1, 9), None)))
        .node(node(NodeBuilder::new("/Files", "sling:Folder")))
        .node(node(
            NodeBuilder::new("/Files/report.pdf", node_types::FILE)
                .date(property_names::LAST_MODIFIED, at(9, 9)),
        ))
        .node(node(
            NodeBuilder::new("/Files/report.pdf/jcr:content", node_types::RESOURCE)
                .binary(property_names::DATA, b"%PDF-1.7 report".to_vec())
                .string(property_names::MIME_TYPE, "application/pdf"),
        ))
        .node(node(
            NodeBuilder::new("/Files/empty.txt", node_types::FILE)
                .date(property_names::LAST_MODIFIED, at(9, 10)),
        ))
}

pub fn clinical_repository() -> Arc<MemoryRepository> {
    Arc::new(clinical_builder().build().unwrap())
}

pub fn engine() -> Arc<SerializationEngine> {
    Arc::new(SerializationEngine::new(Arc::new(builtin_registry().unwrap())))
}

pub fn export(name: &str, retriever: &str, formatter: &str, store: &str) -> ExportConfigDefinition {
    ExportConfigDefinition::new(ExportName::new(name).unwrap(), retriever, formatter, store)
}

/// Built-in stages plus the test doubles below
pub fn stages(store: Arc<dyn DataStore>) -> StageRegistry {
    let mut stages = StageRegistry::with_builtin(engine()).unwrap();
    stages.register_store(store).unwrap();
    stages
}

pub fn coordinator(repository: &Arc<MemoryRepository>, stages: StageRegistry) -> ExportCoordinator {
    ExportCoordinator::new(repository.clone(), Arc::new(stages))
}

/// Keeps stored artifacts in memory
#[derive(Default)]
pub struct RecordingStore {
    stored: Mutex<Vec<(String, String, Vec<u8>)>>,
}

impl RecordingStore {
    /// `(filename, mime type, bytes)` in store order
    pub fn stored(&self) -> Vec<(String, String, Vec<u8>)> {
        self.stored.lock().unwrap().clone()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.stored().into_iter().map(|(name, _, _)| name).collect()
    }

    /// Overwrites a stored artifact, as if it were corrupted after the run
    pub fn corrupt(&self, filename: &str) {
        let mut stored = self.stored.lock().unwrap();
        if let Some(entry) = stored.iter_mut().find(|(name, _, _)| name == filename) {
            entry.2 = b"corrupted".to_vec();
        }
    }
}

#[async_trait]
impl DataStore for RecordingStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn validate(&self, _config: &ExportConfigDefinition) -> Result<()> {
        Ok(())
    }

    async fn store(
        &self,
        content: &[u8],
        filename: &str,
        mime_type: &str,
        _config: &ExportConfigDefinition,
    ) -> Result<()> {
        self.stored.lock().unwrap().push((
            filename.to_string(),
            mime_type.to_string(),
            content.to_vec(),
        ));
        Ok(())
    }

    async fn read_back(
        &self,
        filename: &str,
        _config: &ExportConfigDefinition,
    ) -> Result<Option<Vec<u8>>> {
        Ok(self
            .stored
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _, _)| name == filename)
            .map(|(_, _, bytes)| bytes.clone()))
    }
}

/// Rejects every file whose name contains `needle`
pub struct FailingStore {
    pub needle: String,
    pub inner: RecordingStore,
}

impl FailingStore {
    pub fn new(needle: &str) -> Self {
        Self {
            needle: needle.to_string(),
            inner: RecordingStore::default(),
        }
    }
}

#[async_trait]
impl DataStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    fn validate(&self, _config: &ExportConfigDefinition) -> Result<()> {
        Ok(())
    }

    async fn store(
        &self,
        content: &[u8],
        filename: &str,
        mime_type: &str,
        config: &ExportConfigDefinition,
    ) -> Result<()> {
        if filename.contains(&self.needle) {
            return Err(StrataError::Storage(format!("disk full while writing {filename}")));
        }
        self.inner.store(content, filename, mime_type, config).await
    }
}

/// Returns a fixed list of resources
pub struct StaticRetriever(pub Vec<ResourceIdentifier>);

impl DataRetriever for StaticRetriever {
    fn name(&self) -> &str {
        "static"
    }

    fn get_resources_to_export(
        &self,
        _config: &ExportConfigDefinition,
        _window: &TimeWindow,
        _session: &dyn strata::adapters::repository::RepositorySession,
    ) -> Result<Vec<ResourceIdentifier>> {
        Ok(self.0.clone())
    }
}
