//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::StrataConfig;
use crate::domain::errors::StrataError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("environment placeholder pattern is valid")
});

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`StrataConfig`]
/// 4. Applies environment variable overrides (`STRATA_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`StrataError::Configuration`] if the file cannot be read or
/// parsed, a referenced environment variable is not set, or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use strata::config::loader::load_config;
///
/// let config = load_config("strata.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<StrataConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StrataError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        StrataError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text the same way [`load_config`] does
///
/// # Errors
///
/// Returns [`StrataError::Configuration`] on substitution, parse or
/// validation failures.
pub fn parse_config(contents: &str) -> Result<StrataConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: StrataConfig = toml::from_str(&contents)
        .map_err(|e| StrataError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        StrataError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched. Every missing variable is reported in
/// one error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let mut missing_vars: Vec<String> = Vec::new();

    let lines: Vec<String> = input
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return line.to_string();
            }
            ENV_PLACEHOLDER
                .replace_all(line, |caps: &regex::Captures<'_>| {
                    let var_name = &caps[1];
                    std::env::var(var_name).unwrap_or_else(|_| {
                        if !missing_vars.iter().any(|v| v == var_name) {
                            missing_vars.push(var_name.to_string());
                        }
                        caps[0].to_string()
                    })
                })
                .into_owned()
        })
        .collect();

    if !missing_vars.is_empty() {
        return Err(StrataError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using the `STRATA_*` prefix
///
/// Variables follow the pattern `STRATA_<SECTION>_<KEY>`, for example
/// `STRATA_REPOSITORY_FIXTURE`. Boolean overrides that do not parse are
/// ignored.
fn apply_env_overrides(config: &mut StrataConfig) {
    if let Ok(val) = std::env::var("STRATA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("STRATA_REPOSITORY_FIXTURE") {
        config.repository.fixture = val;
    }

    if let Some(enabled) = env_flag("STRATA_VERIFICATION_ENABLED") {
        config.verification.enabled = enabled;
    }

    if let Some(enabled) = env_flag("STRATA_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("STRATA_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
[application]
log_level = "info"

[repository]
fixture = "content.json"

[[export]]
name = "nightly"
retriever = "changedSubjects"
formatter = "json"
store = "filesystem"

[export.parameters]
savePath = "/tmp/strata"
"#;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("STRATA_TEST_SAVE_PATH", "/data/out");
        let input = "# uses ${STRATA_TEST_COMMENTED}\nsavePath = \"${STRATA_TEST_SAVE_PATH}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "# uses ${STRATA_TEST_COMMENTED}\nsavePath = \"/data/out\"");
        std::env::remove_var("STRATA_TEST_SAVE_PATH");
    }

    #[test]
    fn test_substitute_env_vars_reports_all_missing() {
        let input = "a = \"${STRATA_TEST_MISSING_A}\"\nb = \"${STRATA_TEST_MISSING_B}\"";
        let err = substitute_env_vars(input).unwrap_err().to_string();
        assert!(err.contains("STRATA_TEST_MISSING_A"));
        assert!(err.contains("STRATA_TEST_MISSING_B"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("nonexistent.toml").unwrap_err();
        assert!(matches!(err, StrataError::Configuration(_)));
    }

    #[test]
    fn test_load_config_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(CONFIG.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.repository.fixture, "content.json");
        assert_eq!(config.exports.len(), 1);
        assert_eq!(
            config.export("nightly").unwrap().parameters.get("savePath"),
            Some("/tmp/strata")
        );
    }

    #[test]
    fn test_invalid_config_is_configuration_error() {
        let err = parse_config(&CONFIG.replace("\"info\"", "\"chatty\"")).unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }
}
