//! Configuration schema types
//!
//! This module defines the configuration structure for Strata.

use crate::domain::ids::ExportName;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// Main Strata configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrataConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Content repository the exports read from
    pub repository: RepositoryConfig,

    /// Post-export verification settings
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Export configuration definitions
    #[serde(default, rename = "export")]
    pub exports: Vec<ExportConfigDefinition>,
}

impl StrataConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.repository.validate()?;
        self.logging.validate()?;

        let mut names = HashSet::new();
        for export in &self.exports {
            export.validate()?;
            if !names.insert(export.name.as_str()) {
                return Err(format!("Duplicate export name '{}'", export.name));
            }
        }
        Ok(())
    }

    /// Looks up an export definition by name
    pub fn export(&self, name: &str) -> Option<&ExportConfigDefinition> {
        self.exports.iter().find(|e| e.name.as_str() == name)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Content repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Path to the JSON content fixture loaded into memory
    pub fixture: String,
}

impl RepositoryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.fixture.trim().is_empty() {
            return Err("repository.fixture cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Post-export verification configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Read every stored artifact back and compare checksums
    #[serde(default)]
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy (daily, hourly)
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if !["daily", "hourly"].contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: daily, hourly",
                self.local_rotation
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

/// One named export: which retriever, formatter and store to chain, and
/// the parameters handed to them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfigDefinition {
    /// Unique export name
    pub name: ExportName,

    /// Retriever name, e.g. `changedSubjects`
    pub retriever: String,

    /// Formatter name, e.g. `json`
    pub formatter: String,

    /// Store name, e.g. `filesystem`
    pub store: String,

    /// Length of a scheduled window in days
    #[serde(default = "default_frequency_in_days")]
    pub frequency_in_days: u32,

    /// Template of artifact file names
    #[serde(default = "default_file_name_format")]
    pub file_name_format: String,

    /// Named parameters; some keys repeat
    #[serde(default)]
    pub parameters: Parameters,
}

impl ExportConfigDefinition {
    /// Creates a definition with default schedule and file name format
    pub fn new(name: ExportName, retriever: &str, formatter: &str, store: &str) -> Self {
        Self {
            name,
            retriever: retriever.to_string(),
            formatter: formatter.to_string(),
            store: store.to_string(),
            frequency_in_days: default_frequency_in_days(),
            file_name_format: default_file_name_format(),
            parameters: Parameters::default(),
        }
    }

    /// Appends a parameter value; repeated names accumulate
    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters.add(name, value);
        self
    }

    fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("retriever", &self.retriever),
            ("formatter", &self.formatter),
            ("store", &self.store),
            ("file_name_format", &self.file_name_format),
        ] {
            if value.trim().is_empty() {
                return Err(format!("export '{}': {field} cannot be empty", self.name));
            }
        }
        if self.frequency_in_days == 0 {
            return Err(format!(
                "export '{}': frequency_in_days must be at least 1",
                self.name
            ));
        }
        Ok(())
    }
}

/// Multimap of named string parameters
///
/// In TOML each key maps to a string or an array of strings:
///
/// ```toml
/// [export.parameters]
/// savePath = "/var/exports"
/// questionnaire = ["/Questionnaires/Visit", "/Questionnaires/Labs"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    /// Creates an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value; existing values of the same name are kept
    pub fn add(&mut self, name: &str, value: &str) {
        self.entries.push((name.to_string(), value.to_string()));
    }

    /// First value of a parameter
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First non-blank value of a parameter
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get_all(name).into_iter().find(|v| !v.trim().is_empty())
    }

    /// Every value of a parameter, in declaration order
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Whether `name` was given at all, even with a blank value
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Whether no parameter was given
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for Parameters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let table = toml::Table::deserialize(deserializer)?;
        let mut parameters = Parameters::new();
        for (name, value) in table {
            let values = OneOrMany::deserialize(value).map_err(|_| {
                serde::de::Error::custom(format!(
                    "parameter '{name}' must be a string or an array of strings"
                ))
            })?;
            match values {
                OneOrMany::One(v) => parameters.add(&name, &v),
                OneOrMany::Many(vs) => vs.iter().for_each(|v| parameters.add(&name, v)),
            }
        }
        Ok(parameters)
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut grouped: Vec<(&str, Vec<String>)> = Vec::new();
        for (name, value) in &self.entries {
            match grouped.iter_mut().find(|(n, _)| n == name) {
                Some((_, values)) => values.push(value.clone()),
                None => grouped.push((name.as_str(), vec![value.clone()])),
            }
        }
        serializer.collect_map(grouped.into_iter().map(|(name, mut values)| {
            let value = if values.len() == 1 {
                OneOrMany::One(values.remove(0))
            } else {
                OneOrMany::Many(values)
            };
            (name, value)
        }))
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

fn default_frequency_in_days() -> u32 {
    1
}

fn default_file_name_format() -> String {
    "{resourceLabel}_{kind}_{now(%Y%m%d)}".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[application]
log_level = "debug"

[repository]
fixture = "content.json"

[[export]]
name = "nightly-json"
retriever = "changedSubjects"
formatter = "json"
store = "filesystem"

[export.parameters]
savePath = "/var/exports"
questionnaire = ["/Questionnaires/A", "/Questionnaires/B"]

[[export]]
name = "weekly-csv"
retriever = "questionnaires"
formatter = "csv"
store = "filesystem"
frequency_in_days = 7
file_name_format = "{resourceLabel}_{start(%Y%m%d)}"
"#;

    #[test]
    fn test_parse_config() {
        let config: StrataConfig = toml::from_str(CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.exports.len(), 2);

        let nightly = config.export("nightly-json").unwrap();
        assert_eq!(nightly.frequency_in_days, 1);
        assert_eq!(nightly.file_name_format, "{resourceLabel}_{kind}_{now(%Y%m%d)}");
        assert_eq!(nightly.parameters.get("savePath"), Some("/var/exports"));
        assert_eq!(
            nightly.parameters.get_all("questionnaire"),
            vec!["/Questionnaires/A", "/Questionnaires/B"]
        );

        let weekly = config.export("weekly-csv").unwrap();
        assert_eq!(weekly.frequency_in_days, 7);
        assert!(weekly.parameters.is_empty());
    }

    #[test]
    fn test_duplicate_export_names_rejected() {
        let doubled = format!(
            "{CONFIG}\n[[export]]\nname = \"weekly-csv\"\nretriever = \"a\"\nformatter = \"b\"\nstore = \"c\"\n"
        );
        let config: StrataConfig = toml::from_str(&doubled).unwrap();
        assert!(config.validate().unwrap_err().contains("Duplicate export name"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config: StrataConfig = toml::from_str(CONFIG).unwrap();
        config.exports[0].frequency_in_days = 0;
        assert!(config.validate().is_err());

        let mut config: StrataConfig = toml::from_str(CONFIG).unwrap();
        config.application.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config: StrataConfig = toml::from_str(CONFIG).unwrap();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_parameter_value() {
        let bad = CONFIG.replace("savePath = \"/var/exports\"", "savePath = 42");
        assert!(toml::from_str::<StrataConfig>(&bad).is_err());
    }

    #[test]
    fn test_parameters_serialize_round_trip() {
        let mut parameters = Parameters::new();
        parameters.add("savePath", "/tmp/out");
        parameters.add("questionnaire", "/Q/A");
        parameters.add("questionnaire", "/Q/B");

        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            parameters: Parameters,
        }
        let text = toml::to_string(&Wrapper { parameters: parameters.clone() }).unwrap();
        let back: Wrapper = toml::from_str(&text).unwrap();
        assert_eq!(back.parameters, parameters);
    }

    #[test]
    fn test_parameters_lookup() {
        let mut parameters = Parameters::new();
        parameters.add("selectors", " ");
        parameters.add("selectors", ".deep");
        assert_eq!(parameters.get("selectors"), Some(" "));
        assert_eq!(parameters.get_non_empty("selectors"), Some(".deep"));
        assert!(parameters.contains("selectors"));
        assert!(!parameters.contains("savePath"));
    }
}
