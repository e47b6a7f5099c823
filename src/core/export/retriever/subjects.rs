//! Subjects with forms changed in the window

use super::{run_query, FormSelection};
use crate::adapters::repository::RepositorySession;
use crate::config::ExportConfigDefinition;
use crate::core::export::pipeline::DataRetriever;
use crate::domain::{node_types, property_names, ResourceIdentifier, Result, TimeWindow};

/// Subjects with at least one form modified in the window
///
/// The label is the subject's `identifier` property, falling back to the
/// node name.
pub struct ChangedSubjectsRetriever;

impl DataRetriever for ChangedSubjectsRetriever {
    fn name(&self) -> &str {
        "changedSubjects"
    }

    fn get_resources_to_export(
        &self,
        config: &ExportConfigDefinition,
        window: &TimeWindow,
        session: &dyn RepositorySession,
    ) -> Result<Vec<ResourceIdentifier>> {
        let selection = FormSelection::from_config(config, window, session)?;
        let query = selection
            .forms_query()
            .join(property_names::SUBJECT, node_types::SUBJECT);

        let subjects = run_query(session, &query)?;
        tracing::info!(
            export = %config.name,
            window = %window,
            count = subjects.len(),
            "Found changed subjects"
        );

        Ok(subjects
            .into_iter()
            .map(|subject| {
                let label = subject
                    .string(property_names::IDENTIFIER)
                    .unwrap_or_else(|| subject.name().to_string());
                let export_path = selection.export_path(&subject.path, true);
                ResourceIdentifier::new(subject.path, label, export_path)
            })
            .collect())
    }
}
