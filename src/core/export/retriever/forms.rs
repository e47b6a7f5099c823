//! Forms changed in the window

use super::{run_query, FormSelection};
use crate::adapters::repository::RepositorySession;
use crate::config::ExportConfigDefinition;
use crate::core::export::pipeline::DataRetriever;
use crate::domain::{ResourceIdentifier, Result, TimeWindow};

/// Every form modified in the window, labelled by node name
pub struct ChangedFormsRetriever;

impl DataRetriever for ChangedFormsRetriever {
    fn name(&self) -> &str {
        "changedForms"
    }

    fn get_resources_to_export(
        &self,
        config: &ExportConfigDefinition,
        window: &TimeWindow,
        session: &dyn RepositorySession,
    ) -> Result<Vec<ResourceIdentifier>> {
        let selection = FormSelection::from_config(config, window, session)?;
        let forms = run_query(session, &selection.forms_query())?;
        tracing::info!(
            export = %config.name,
            window = %window,
            count = forms.len(),
            "Found changed forms"
        );

        Ok(forms
            .into_iter()
            .map(|form| {
                let label = form.name().to_string();
                let export_path = selection.export_path(&form.path, false);
                ResourceIdentifier::new(form.path, label, export_path)
            })
            .collect())
    }
}
