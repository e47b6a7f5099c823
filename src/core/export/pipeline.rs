//! Export stages and the registry that resolves them by name
//!
//! An export chains three stages: a [`DataRetriever`] selects the resources
//! that changed in a window, a [`DataFormatter`] renders each one, and a
//! [`DataStore`] persists the rendered bytes. Stages are looked up by the
//! names given in an [`ExportConfigDefinition`].

use super::formatter::{CsvFormatter, JsonFormatter, RawFormatter};
use super::retriever::{
    ChangedFilesRetriever, ChangedFormsRetriever, ChangedSubjectsRetriever,
    QuestionnairesRetriever,
};
use super::store::FilesystemStore;
use crate::adapters::repository::RepositorySession;
use crate::config::ExportConfigDefinition;
use crate::core::serialize::SerializationEngine;
use crate::domain::{
    ResourceIdentifier, ResourceRepresentation, Result, StrataError, TimeWindow,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Selects the resources to export for a time window
pub trait DataRetriever: Send + Sync {
    fn name(&self) -> &str;

    /// Lists the resources that qualify for `window`
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Retrieval`] when the selection query fails;
    /// the whole run is aborted.
    fn get_resources_to_export(
        &self,
        config: &ExportConfigDefinition,
        window: &TimeWindow,
        session: &dyn RepositorySession,
    ) -> Result<Vec<ResourceIdentifier>>;
}

/// Renders one resource into bytes
pub trait DataFormatter: Send + Sync {
    fn name(&self) -> &str;

    /// Renders the resource through its export path
    ///
    /// Returns `Ok(None)` when the resource has nothing this formatter can
    /// render.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Formatting`] when the export path no longer
    /// resolves or the content cannot be rendered.
    fn format(
        &self,
        identifier: &ResourceIdentifier,
        window: &TimeWindow,
        config: &ExportConfigDefinition,
        session: &dyn RepositorySession,
    ) -> Result<Option<ResourceRepresentation>>;
}

/// Persists rendered artifacts
#[async_trait]
pub trait DataStore: Send + Sync {
    fn name(&self) -> &str;

    /// Checks the store parameters before any resource is processed
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Configuration`] when a required parameter is
    /// missing.
    fn validate(&self, config: &ExportConfigDefinition) -> Result<()>;

    /// Writes `content` under `filename`
    async fn store(
        &self,
        content: &[u8],
        filename: &str,
        mime_type: &str,
        config: &ExportConfigDefinition,
    ) -> Result<()>;

    /// Reads a stored artifact back; `None` when the store cannot read
    async fn read_back(
        &self,
        _filename: &str,
        _config: &ExportConfigDefinition,
    ) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// The three stages of one export
#[derive(Clone)]
pub struct DataPipeline {
    pub retriever: Arc<dyn DataRetriever>,
    pub formatter: Arc<dyn DataFormatter>,
    pub store: Arc<dyn DataStore>,
}

impl fmt::Debug for DataPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataPipeline")
            .field("retriever", &self.retriever.name())
            .field("formatter", &self.formatter.name())
            .field("store", &self.store.name())
            .finish()
    }
}

/// Named stage implementations
#[derive(Default, Clone)]
pub struct StageRegistry {
    retrievers: BTreeMap<String, Arc<dyn DataRetriever>>,
    formatters: BTreeMap<String, Arc<dyn DataFormatter>>,
    stores: BTreeMap<String, Arc<dyn DataStore>>,
}

impl StageRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in stage
    ///
    /// # Errors
    ///
    /// Returns an error if two built-in stages share a name.
    pub fn with_builtin(engine: Arc<SerializationEngine>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register_retriever(Arc::new(ChangedSubjectsRetriever))?;
        registry.register_retriever(Arc::new(ChangedFormsRetriever))?;
        registry.register_retriever(Arc::new(QuestionnairesRetriever))?;
        registry.register_retriever(Arc::new(ChangedFilesRetriever))?;
        registry.register_formatter(Arc::new(JsonFormatter::new(engine.clone())))?;
        registry.register_formatter(Arc::new(CsvFormatter::new(engine)))?;
        registry.register_formatter(Arc::new(RawFormatter))?;
        registry.register_store(Arc::new(FilesystemStore))?;
        Ok(registry)
    }

    /// Registers a retriever under its name
    pub fn register_retriever(&mut self, retriever: Arc<dyn DataRetriever>) -> Result<()> {
        insert_unique(&mut self.retrievers, "retriever", retriever.name().to_string(), retriever)
    }

    /// Registers a formatter under its name
    pub fn register_formatter(&mut self, formatter: Arc<dyn DataFormatter>) -> Result<()> {
        insert_unique(&mut self.formatters, "formatter", formatter.name().to_string(), formatter)
    }

    /// Registers a store under its name
    pub fn register_store(&mut self, store: Arc<dyn DataStore>) -> Result<()> {
        insert_unique(&mut self.stores, "store", store.name().to_string(), store)
    }

    /// Retriever names in sorted order
    pub fn retriever_names(&self) -> Vec<&str> {
        self.retrievers.keys().map(String::as_str).collect()
    }

    /// Formatter names in sorted order
    pub fn formatter_names(&self) -> Vec<&str> {
        self.formatters.keys().map(String::as_str).collect()
    }

    /// Store names in sorted order
    pub fn store_names(&self) -> Vec<&str> {
        self.stores.keys().map(String::as_str).collect()
    }

    /// Resolves the stages named by an export definition
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Configuration`] naming the first unknown stage.
    pub fn build_pipeline(&self, config: &ExportConfigDefinition) -> Result<DataPipeline> {
        Ok(DataPipeline {
            retriever: lookup(&self.retrievers, "retriever", &config.retriever)?,
            formatter: lookup(&self.formatters, "formatter", &config.formatter)?,
            store: lookup(&self.stores, "store", &config.store)?,
        })
    }
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRegistry")
            .field("retrievers", &self.retriever_names())
            .field("formatters", &self.formatter_names())
            .field("stores", &self.store_names())
            .finish()
    }
}

fn insert_unique<T: ?Sized>(
    stages: &mut BTreeMap<String, Arc<T>>,
    kind: &str,
    name: String,
    stage: Arc<T>,
) -> Result<()> {
    if stages.contains_key(&name) {
        return Err(StrataError::Configuration(format!(
            "A {kind} named '{name}' is already registered"
        )));
    }
    stages.insert(name, stage);
    Ok(())
}

fn lookup<T: ?Sized>(
    stages: &BTreeMap<String, Arc<T>>,
    kind: &str,
    name: &str,
) -> Result<Arc<T>> {
    stages.get(name).cloned().ok_or_else(|| {
        StrataError::Configuration(format!(
            "Unknown {kind} '{name}'. Available: {}",
            stages.keys().cloned().collect::<Vec<_>>().join(", ")
        ))
    })
}
