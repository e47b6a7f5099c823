//! Stored files changed in the window

use super::run_query;
use crate::adapters::repository::{NodeQuery, Predicate, RepositorySession};
use crate::config::ExportConfigDefinition;
use crate::core::export::pipeline::DataRetriever;
use crate::domain::{node_types, property_names, ResourceIdentifier, Result, TimeWindow};

/// Files modified in the window
///
/// Files have no status flags, so the status exclusion does not apply. The
/// export path is the file path itself, meant for the `raw` formatter.
pub struct ChangedFilesRetriever;

impl DataRetriever for ChangedFilesRetriever {
    fn name(&self) -> &str {
        "changedFiles"
    }

    fn get_resources_to_export(
        &self,
        config: &ExportConfigDefinition,
        window: &TimeWindow,
        session: &dyn RepositorySession,
    ) -> Result<Vec<ResourceIdentifier>> {
        let mut query = NodeQuery::select(node_types::FILE).filter(Predicate::at_least(
            property_names::LAST_MODIFIED,
            window.start(),
        ));
        if let Some(end) = window.end() {
            query = query.filter(Predicate::before(property_names::LAST_MODIFIED, end));
        }

        let files = run_query(session, &query.order_by(property_names::LAST_MODIFIED))?;
        tracing::info!(
            export = %config.name,
            window = %window,
            count = files.len(),
            "Found changed files"
        );

        Ok(files
            .into_iter()
            .map(|file| {
                let label = file.name().to_string();
                let export_path = file.path.to_string();
                ResourceIdentifier::new(file.path, label, export_path)
            })
            .collect())
    }
}
