//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Strata using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Strata - incremental export and serialization of content trees
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
#[command(author = "Strata Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "strata.toml", env = "STRATA_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "STRATA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run configured exports for a time window
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Print the JSON of a node path with selectors
    Serialize(commands::serialize::SerializeArgs),

    /// List the serialization processors
    Processors(commands::processors::ProcessorsArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::export::ModeArg;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["strata", "export"]);
        assert_eq!(cli.config, "strata.toml");
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert!(args.names.is_empty());
        assert_eq!(args.mode, ModeArg::Scheduled);
    }

    #[test]
    fn test_cli_parse_export_manual() {
        let cli = Cli::parse_from([
            "strata", "export", "--name", "a", "--name", "b", "--mode", "manual", "--from",
            "2024-05-01", "--to", "2024-05-08", "--verify",
        ]);
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.names, vec!["a", "b"]);
        assert_eq!(args.mode, ModeArg::Manual);
        assert_eq!(args.from.unwrap().to_string(), "2024-05-01");
        assert!(args.verify);
    }

    #[test]
    fn test_cli_manual_mode_requires_from() {
        assert!(Cli::try_parse_from(["strata", "export", "--mode", "manual"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config_and_log_level() {
        let cli = Cli::parse_from([
            "strata", "--config", "custom.toml", "--log-level", "debug", "validate-config",
        ]);
        assert_eq!(cli.config, "custom.toml");
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_serialize() {
        let cli = Cli::parse_from(["strata", "serialize", "/Subjects/s1.deep"]);
        let Commands::Serialize(args) = cli.command else {
            panic!("expected serialize");
        };
        assert_eq!(args.path, "/Subjects/s1.deep");
    }

    #[test]
    fn test_cli_parse_processors_and_init() {
        assert!(matches!(
            Cli::parse_from(["strata", "processors"]).command,
            Commands::Processors(_)
        ));
        assert!(matches!(
            Cli::parse_from(["strata", "init"]).command,
            Commands::Init(_)
        ));
    }
}
