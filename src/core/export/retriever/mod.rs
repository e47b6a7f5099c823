//! Built-in retrievers
//!
//! Every retriever selects by the `jcr:lastModified` of forms (or files)
//! inside the window `[start, end)`. Forms flagged with an excluded status
//! never qualify, and an optional `questionnaire` whitelist narrows the
//! forms further. Subject and questionnaire resources carry an export path
//! that re-applies the same window and filters to their attached data.

mod files;
mod forms;
mod questionnaires;
mod subjects;

pub use files::ChangedFilesRetriever;
pub use forms::ChangedFormsRetriever;
pub use questionnaires::QuestionnairesRetriever;
pub use subjects::ChangedSubjectsRetriever;

use crate::adapters::repository::{NodeQuery, Predicate, RepositorySession};
use crate::config::ExportConfigDefinition;
use crate::domain::node::format_instant;
use crate::domain::{
    node_types, property_names, Node, NodePath, PathInfo, Result, StrataError, TimeWindow,
};

/// Status excluded when `excludeStatus` is not configured
pub const DEFAULT_EXCLUDED_STATUS: &str = "INCOMPLETE";

/// Window and filter settings shared by the form-based retrievers
#[derive(Debug, Clone)]
pub(crate) struct FormSelection {
    window: TimeWindow,
    excluded_statuses: Vec<String>,
    /// Whitelisted questionnaire paths, as configured
    questionnaire_paths: Vec<String>,
    /// Identifiers of the whitelisted questionnaires that exist
    questionnaire_ids: Vec<String>,
    selectors: Option<String>,
}

impl FormSelection {
    /// Reads the selection parameters of an export
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Retrieval`] if the whitelisted questionnaires
    /// cannot be looked up.
    pub(crate) fn from_config(
        config: &ExportConfigDefinition,
        window: &TimeWindow,
        session: &dyn RepositorySession,
    ) -> Result<Self> {
        let excluded_statuses = if config.parameters.contains("excludeStatus") {
            config
                .parameters
                .get_all("excludeStatus")
                .into_iter()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        } else {
            vec![DEFAULT_EXCLUDED_STATUS.to_string()]
        };

        let questionnaire_paths: Vec<String> = config
            .parameters
            .get_all("questionnaire")
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();

        let mut questionnaire_ids = Vec::new();
        for raw in &questionnaire_paths {
            let Ok(path) = NodePath::new(raw.as_str()) else {
                tracing::warn!(questionnaire = %raw, "Ignoring invalid questionnaire path");
                continue;
            };
            match session.node(&path).map_err(retrieval_error)? {
                Some(node) if node.is_type(node_types::QUESTIONNAIRE) => {
                    questionnaire_ids.push(node.identifier)
                }
                _ => tracing::warn!(questionnaire = %raw, "Whitelisted questionnaire not found"),
            }
        }

        Ok(Self {
            window: *window,
            excluded_statuses,
            questionnaire_paths,
            questionnaire_ids,
            selectors: config
                .parameters
                .get_non_empty("selectors")
                .map(String::from),
        })
    }

    /// Query for the forms that qualify in the window
    pub(crate) fn forms_query(&self) -> NodeQuery {
        let mut query = NodeQuery::select(node_types::FORM).filter(Predicate::at_least(
            property_names::LAST_MODIFIED,
            self.window.start(),
        ));
        if let Some(end) = self.window.end() {
            query = query.filter(Predicate::before(property_names::LAST_MODIFIED, end));
        }
        for status in &self.excluded_statuses {
            query = query.filter(Predicate::not_equals(
                property_names::STATUS_FLAGS,
                status.clone(),
            ));
        }
        if !self.questionnaire_paths.is_empty() {
            query = query.filter(Predicate::references_any(
                property_names::QUESTIONNAIRE,
                self.questionnaire_ids.clone(),
            ));
        }
        query.order_by(property_names::LAST_MODIFIED)
    }

    /// Export path `<source><selectors>[.data]<filters>`
    pub(crate) fn export_path(&self, source: &NodePath, with_data: bool) -> String {
        let mut info = PathInfo::empty();
        if let Some(selectors) = &self.selectors {
            info.extend_selectors(selectors);
        }
        if !with_data {
            return format!("{source}{info}");
        }

        info.push_selector("data");
        info.push_filter("modifiedAfter", &format_instant(&self.window.start()));
        if let Some(end) = self.window.end() {
            info.push_filter("modifiedBefore", &format_instant(&end));
        }
        for status in &self.excluded_statuses {
            info.push_filter("statusNot", status);
        }
        for questionnaire in &self.questionnaire_paths {
            info.push_filter("questionnaire", questionnaire);
        }
        format!("{source}{info}")
    }
}

/// Runs a selection query, mapping failures to retrieval errors
pub(crate) fn run_query(
    session: &dyn RepositorySession,
    query: &NodeQuery,
) -> Result<Vec<Node>> {
    tracing::debug!(query = %query, "Running retrieval query");
    session.find(query).map_err(retrieval_error)
}

pub(crate) fn retrieval_error(error: StrataError) -> StrataError {
    match error {
        StrataError::Retrieval(_) => error,
        other => StrataError::Retrieval(other.to_string()),
    }
}
