//! CSV and TSV formatter
//!
//! Flattens the serialized document into one row per form, with nested keys
//! joined by `/`.

use super::{contents_summary, serialize_export_path};
use crate::adapters::repository::RepositorySession;
use crate::config::ExportConfigDefinition;
use crate::core::export::pipeline::DataFormatter;
use crate::core::serialize::SerializationEngine;
use crate::domain::{ResourceIdentifier, ResourceRepresentation, Result, StrataError, TimeWindow};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

const COLUMN_SEPARATOR: char = '/';
const MULTI_VALUE_SEPARATOR: &str = ";";

/// Flattens the filtered JSON document of a resource into a table
///
/// Each object found in the top-level arrays of the document (the attached
/// forms) becomes one row; a document without such objects becomes a single
/// row. Nested objects turn into `/`-joined column names. The `delimiter`
/// parameter switches to tab-separated output when set to `tab`.
pub struct CsvFormatter {
    engine: Arc<SerializationEngine>,
}

impl CsvFormatter {
    /// Creates a formatter rendering through `engine`
    pub fn new(engine: Arc<SerializationEngine>) -> Self {
        Self { engine }
    }
}

impl DataFormatter for CsvFormatter {
    fn name(&self) -> &str {
        "csv"
    }

    fn format(
        &self,
        identifier: &ResourceIdentifier,
        _window: &TimeWindow,
        config: &ExportConfigDefinition,
        session: &dyn RepositorySession,
    ) -> Result<Option<ResourceRepresentation>> {
        let tabs = config
            .parameters
            .get("delimiter")
            .is_some_and(|d| d.eq_ignore_ascii_case("tab") || d == "\t");

        let document = serialize_export_path(&self.engine, session, identifier)?;
        let table = Table::from_document(&document);
        let content = table.write(if tabs { b'\t' } else { b',' })?;

        let (mime_type, extension) = if tabs {
            ("text/tab-separated-values", "tsv")
        } else {
            ("text/csv", "csv")
        };
        Ok(Some(ResourceRepresentation {
            identifier: identifier.clone(),
            content,
            mime_type: mime_type.to_string(),
            contents_summary: contents_summary(&document),
            artifact_kind: "table".to_string(),
            extension: extension.to_string(),
        }))
    }
}

/// Rows of flattened cells sharing one header
#[derive(Debug, Default)]
struct Table {
    columns: Vec<String>,
    rows: Vec<HashMap<String, String>>,
}

impl Table {
    fn from_document(document: &Value) -> Self {
        let mut table = Table::default();
        let items: Vec<&Map<String, Value>> = match document {
            Value::Object(map) => map
                .values()
                .filter_map(Value::as_array)
                .flatten()
                .filter_map(Value::as_object)
                .collect(),
            _ => Vec::new(),
        };

        if items.is_empty() {
            let mut cells = Vec::new();
            flatten(None, document, &mut cells);
            table.push_row(cells);
        } else {
            for item in items {
                let mut cells = Vec::new();
                for (key, value) in item {
                    flatten(Some(key), value, &mut cells);
                }
                table.push_row(cells);
            }
        }
        table
    }

    fn push_row(&mut self, cells: Vec<(String, String)>) {
        let mut row = HashMap::with_capacity(cells.len());
        for (column, value) in cells {
            if !self.columns.contains(&column) {
                self.columns.push(column.clone());
            }
            row.insert(column, value);
        }
        self.rows.push(row);
    }

    fn write(&self, delimiter: u8) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        writer.write_record(&self.columns).map_err(csv_error)?;
        for row in &self.rows {
            let record = self
                .columns
                .iter()
                .map(|column| row.get(column).map(String::as_str).unwrap_or_default());
            writer.write_record(record).map_err(csv_error)?;
        }
        writer
            .into_inner()
            .map_err(|e| StrataError::Formatting(format!("Cannot finish table: {e}")))
    }
}

fn csv_error(error: csv::Error) -> StrataError {
    StrataError::Formatting(format!("Cannot write table: {error}"))
}

fn flatten(prefix: Option<&str>, value: &Value, cells: &mut Vec<(String, String)>) {
    let column = |key: &str| match prefix {
        Some(prefix) => format!("{prefix}{COLUMN_SEPARATOR}{key}"),
        None => key.to_string(),
    };
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten(Some(&column(key)), nested, cells);
            }
        }
        Value::Array(items) if items.iter().all(is_scalar) => {
            let joined = items
                .iter()
                .map(scalar_text)
                .collect::<Vec<_>>()
                .join(MULTI_VALUE_SEPARATOR);
            cells.push((prefix.unwrap_or_default().to_string(), joined));
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten(Some(&column(&index.to_string())), nested, cells);
            }
        }
        scalar => cells.push((prefix.unwrap_or_default().to_string(), scalar_text(scalar))),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
