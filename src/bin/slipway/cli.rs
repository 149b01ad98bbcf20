//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Slipway - a recipe evaluator and build-graph orchestrator for native libraries
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Recipe registry to resolve against (overrides the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global flags, detached from the parsed `Cli` so subcommand args can
/// be moved out of it.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub registry: Option<PathBuf>,
}

impl Cli {
    pub fn globals(&self) -> GlobalArgs {
        GlobalArgs {
            registry: self.registry.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the dependency graph and generate build descriptors
    Configure(ConfigureArgs),

    /// Build the current configuration, configuring it first if needed
    Build(BuildArgs),

    /// Assemble the package tree from a built configuration
    Package(PackageArgs),

    /// Display the resolved dependency graph
    Graph(GraphArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Override a setting axis (repeatable)
    #[arg(short = 's', long = "setting", value_name = "AXIS=VALUE", value_parser = parse_key_value)]
    pub settings: Vec<(String, String)>,

    /// Override an option value (repeatable)
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Override a setting axis (repeatable)
    #[arg(short = 's', long = "setting", value_name = "AXIS=VALUE", value_parser = parse_key_value)]
    pub settings: Vec<(String, String)>,

    /// Override an option value (repeatable)
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct PackageArgs {
    /// Override a setting axis (repeatable)
    #[arg(short = 's', long = "setting", value_name = "AXIS=VALUE", value_parser = parse_key_value)]
    pub settings: Vec<(String, String)>,

    /// Override an option value (repeatable)
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct GraphArgs {
    /// Override a setting axis (repeatable)
    #[arg(short = 's', long = "setting", value_name = "AXIS=VALUE", value_parser = parse_key_value)]
    pub settings: Vec<(String, String)>,

    /// Override an option value (repeatable)
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Parse a `KEY=VALUE` pair for `-s` and `-o`.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("os=Linux"),
            Ok(("os".to_string(), "Linux".to_string()))
        );
        assert_eq!(
            parse_key_value("compiler.version=13.2"),
            Ok(("compiler.version".to_string(), "13.2".to_string()))
        );
        assert!(parse_key_value("no-equals").is_err());
        assert!(parse_key_value("=value").is_err());
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "slipway",
            "configure",
            "-s",
            "build_type=Debug",
            "-o",
            "shared=true",
        ])
        .unwrap();

        let Commands::Configure(args) = cli.command else {
            panic!("expected configure");
        };
        assert_eq!(
            args.settings,
            vec![("build_type".to_string(), "Debug".to_string())]
        );
        assert_eq!(
            args.options,
            vec![("shared".to_string(), "true".to_string())]
        );
    }
}
