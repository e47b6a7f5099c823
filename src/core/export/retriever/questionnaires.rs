//! Questionnaires with forms changed in the window

use super::{run_query, FormSelection};
use crate::adapters::repository::RepositorySession;
use crate::config::ExportConfigDefinition;
use crate::core::export::pipeline::DataRetriever;
use crate::domain::{node_types, property_names, ResourceIdentifier, Result, TimeWindow};

/// Questionnaires with at least one form modified in the window, labelled by
/// title
pub struct QuestionnairesRetriever;

impl DataRetriever for QuestionnairesRetriever {
    fn name(&self) -> &str {
        "questionnaires"
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
            .join(property_names::QUESTIONNAIRE, node_types::QUESTIONNAIRE);

        let questionnaires = run_query(session, &query)?;
        tracing::info!(
            export = %config.name,
            window = %window,
            count = questionnaires.len(),
            "Found questionnaires with changed forms"
        );

        Ok(questionnaires
            .into_iter()
            .map(|questionnaire| {
                let label = questionnaire
                    .string(property_names::TITLE)
                    .unwrap_or_else(|| questionnaire.name().to_string());
                let export_path = selection.export_path(&questionnaire.path, true);
                ResourceIdentifier::new(questionnaire.path, label, export_path)
            })
            .collect())
    }
}
