//! Init command implementation
//!
//! Writes a sample configuration file, optionally with a small content
//! fixture to export from.

use super::exit_codes;
use clap::Args;
use std::fs;
use std::path::Path;

const SAMPLE_FIXTURE_NAME: &str = "content.json";

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "strata.toml")]
    pub output: String,

    /// Also write a sample content fixture next to the configuration
    #[arg(long)]
    pub with_fixture: bool,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Strata configuration");
        println!();

        let config_path = Path::new(&self.output);
        let fixture_path = config_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(SAMPLE_FIXTURE_NAME);

        let mut targets = vec![config_path.to_path_buf()];
        if self.with_fixture {
            targets.push(fixture_path.clone());
        }
        if let Some(existing) = targets.iter().find(|p| p.exists()) {
            if !self.force {
                println!("❌ File already exists: {}", existing.display());
                println!("   Use --force to overwrite");
                return Ok(exit_codes::CONFIGURATION);
            }
        }

        if let Err(e) = fs::write(config_path, sample_config()) {
            println!("❌ Failed to write configuration file");
            println!("   Error: {e}");
            return Ok(exit_codes::FATAL);
        }
        println!("✅ Configuration file created: {}", self.output);

        if self.with_fixture {
            if let Err(e) = fs::write(&fixture_path, SAMPLE_FIXTURE) {
                println!("❌ Failed to write content fixture");
                println!("   Error: {e}");
                return Ok(exit_codes::FATAL);
            }
            println!("✅ Content fixture created: {}", fixture_path.display());
        }

        println!();
        println!("Next steps:");
        println!("  1. Point [repository].fixture at your content");
        println!("  2. Adjust the [[export]] definitions and their savePath");
        println!("  3. Validate configuration: strata validate-config");
        println!("  4. Run export: strata export");
        println!();
        Ok(exit_codes::SUCCESS)
    }
}

fn sample_config() -> String {
    format!(
        r#"# Strata Configuration File

[application]
# trace, debug, info, warn, error
log_level = "info"

[repository]
# JSON description of the content tree
fixture = "{SAMPLE_FIXTURE_NAME}"

[verification]
# Read every artifact back and compare checksums after a run
enabled = false

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"

# One table per export; exports run independently
[[export]]
name = "subjects-daily"
retriever = "changedSubjects"
formatter = "json"
store = "filesystem"
frequency_in_days = 1
file_name_format = "{{resourceLabel}}_{{kind}}_{{period}}"

[export.parameters]
savePath = "./exports/subjects"
selectors = ".deep.-identify"
excludeStatus = ["INCOMPLETE"]

[[export]]
name = "forms-weekly-csv"
retriever = "changedForms"
formatter = "csv"
store = "filesystem"
frequency_in_days = 7
file_name_format = "{{resourceLabel}}_{{end(%Y%m%d)}}"

[export.parameters]
savePath = "./exports/forms"
delimiter = "tab"
"#
    )
}

const SAMPLE_FIXTURE: &str = r#"{
  "children": [
    { "name": "Questionnaires", "type": "cards:QuestionnairesHomepage", "children": [
      { "name": "Visit", "type": "cards:Questionnaire", "uuid": "q-visit",
        "properties": { "title": "Visit" },
        "children": [
          { "name": "weight", "type": "cards:Question", "uuid": "q-visit-weight",
            "properties": { "text": "Weight", "dataType": "decimal" } }
        ] }
    ] },
    { "name": "Subjects", "type": "cards:SubjectsHomepage", "children": [
      { "name": "s1", "type": "cards:Subject", "uuid": "subject-1",
        "properties": {
          "identifier": "P-0001",
          "jcr:lastModified": { "type": "date", "value": "2024-05-09T08:00:00.000+00:00" }
        } }
    ] },
    { "name": "Forms", "type": "cards:FormsHomepage", "children": [
      { "name": "f1", "type": "cards:Form", "uuid": "form-1",
        "properties": {
          "subject": { "type": "reference", "value": "subject-1" },
          "questionnaire": { "type": "reference", "value": "q-visit" },
          "jcr:lastModified": { "type": "date", "value": "2024-05-09T08:00:00.000+00:00" }
        },
        "children": [
          { "name": "a1", "type": "cards:DecimalAnswer", "uuid": "answer-1",
            "properties": {
              "question": { "type": "reference", "value": "q-visit-weight" },
              "value": 71.5
            } }
        ] }
    ] }
  ]
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::repository::fixture::load_fixture_str;
    use crate::config::parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_sample_config_parses() {
        let config = parse_config(&sample_config()).unwrap();
        assert_eq!(config.exports.len(), 2);
        assert_eq!(config.exports[0].parameters.get("selectors"), Some(".deep.-identify"));
        assert_eq!(config.exports[1].frequency_in_days, 7);
    }

    #[test]
    fn test_sample_fixture_loads() {
        let repository = load_fixture_str(SAMPLE_FIXTURE).unwrap();
        assert!(repository.len() >= 7);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("strata.toml");
        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_fixture: true,
            force: false,
        };

        assert_eq!(args.execute().await.unwrap(), exit_codes::SUCCESS);
        assert!(dir.path().join(SAMPLE_FIXTURE_NAME).exists());
        assert_eq!(args.execute().await.unwrap(), exit_codes::CONFIGURATION);

        let forced = InitArgs { force: true, ..args };
        assert_eq!(forced.execute().await.unwrap(), exit_codes::SUCCESS);
    }
}
