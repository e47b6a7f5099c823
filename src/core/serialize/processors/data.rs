//! Form data attached to subjects and questionnaires

use crate::adapters::repository::{NodeQuery, Predicate};
use crate::core::serialize::accumulator::JsonAccumulator;
use crate::core::serialize::engine::SerializationContext;
use crate::core::serialize::processor::JsonProcessor;
use crate::domain::{node_types, property_names, Node, NodePath};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

const QUESTIONNAIRE_GROUP: &str = "@data";

/// Attaches the forms of a subject or questionnaire root
///
/// Forms are grouped by questionnaire title for subjects and under `@data`
/// for questionnaires. `dataFilter:` tokens of the resolved path narrow the
/// forms and are echoed back under `dataFilters`.
pub struct DataProcessor;

impl JsonProcessor for DataProcessor {
    fn name(&self) -> &str {
        "data"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn can_process(&self, root: &Node) -> bool {
        root.is_type(node_types::SUBJECT) || root.is_type(node_types::QUESTIONNAIRE)
    }

    fn leave(&self, node: &Node, json: &mut JsonAccumulator, context: &SerializationContext<'_>) {
        if !context.is_root(node) {
            return;
        }
        let filters = context.path_info().filters();
        let query = match self.forms_query(node, &filters, context) {
            Ok(query) => query,
            Err(reason) => {
                tracing::warn!(path = %node.path, reason = %reason, "Invalid data filter, no data attached");
                return;
            }
        };
        let forms = match context.session().find(&query) {
            Ok(forms) => forms,
            Err(e) => {
                tracing::warn!(path = %node.path, error = %e, "Cannot query form data");
                return;
            }
        };

        let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
        for form in &forms {
            let key = self.group_key(node, form, context);
            let rendered = context.serialize(form);
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, items)) => items.push(rendered),
                None => groups.push((key, vec![rendered])),
            }
        }
        for (key, items) in groups {
            json.insert(key, Value::Array(items));
        }
        json.insert("dataFilters", Value::Object(echo_filters(&filters)));
    }
}

impl DataProcessor {
    fn forms_query(
        &self,
        root: &Node,
        filters: &[(String, String)],
        context: &SerializationContext<'_>,
    ) -> Result<NodeQuery, String> {
        let link = if root.is_type(node_types::QUESTIONNAIRE) {
            property_names::QUESTIONNAIRE
        } else {
            property_names::SUBJECT
        };
        let mut query = NodeQuery::select(node_types::FORM)
            .filter(Predicate::equals(link, root.identifier.clone()));
        let mut questionnaires = Vec::new();

        for (name, value) in filters {
            let predicate = match name.as_str() {
                "createdAfter" => Predicate::at_least(property_names::CREATED, parse_instant(value)?),
                "createdBefore" => Predicate::before(property_names::CREATED, parse_instant(value)?),
                "modifiedAfter" => {
                    Predicate::at_least(property_names::LAST_MODIFIED, parse_instant(value)?)
                }
                "modifiedBefore" => {
                    Predicate::before(property_names::LAST_MODIFIED, parse_instant(value)?)
                }
                "createdBy" => Predicate::equals(property_names::CREATED_BY, value.clone()),
                "status" => Predicate::equals(property_names::STATUS_FLAGS, value.clone()),
                "statusNot" => Predicate::not_equals(property_names::STATUS_FLAGS, value.clone()),
                "questionnaire" => {
                    questionnaires.push(value.clone());
                    continue;
                }
                other => {
                    tracing::debug!(filter = %other, "Ignoring unknown data filter");
                    continue;
                }
            };
            query = query.filter(predicate);
        }

        if !questionnaires.is_empty() {
            let identifiers = questionnaires
                .iter()
                .filter_map(|path| NodePath::new(path.as_str()).ok())
                .filter_map(|path| context.session().node(&path).ok().flatten())
                .map(|q| q.identifier)
                .collect();
            query = query.filter(Predicate::references_any(
                property_names::QUESTIONNAIRE,
                identifiers,
            ));
        }

        Ok(query.order_by(property_names::CREATED))
    }

    fn group_key(&self, root: &Node, form: &Node, context: &SerializationContext<'_>) -> String {
        if root.is_type(node_types::QUESTIONNAIRE) {
            return QUESTIONNAIRE_GROUP.to_string();
        }
        form.reference(property_names::QUESTIONNAIRE)
            .and_then(|id| context.session().node_by_identifier(id).ok().flatten())
            .map(|q| q.string(property_names::TITLE).unwrap_or_else(|| q.name().to_string()))
            .unwrap_or_else(|| QUESTIONNAIRE_GROUP.to_string())
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("'{value}' is not a timestamp: {e}"))
}

/// Filters as a JSON object; repeated names become arrays
fn echo_filters(filters: &[(String, String)]) -> Map<String, Value> {
    let mut echoed = Map::new();
    for (name, value) in filters {
        let value = Value::String(value.clone());
        match echoed.get_mut(name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                echoed.insert(name.clone(), value);
            }
        }
    }
    echoed
}
