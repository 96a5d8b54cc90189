//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{default_jobs, RunConfig};

/// Top-level CLI parser for `archmap`.
#[derive(Debug, Parser)]
#[command(name = "archmap", version, about = "Map a Java codebase and render architecture diagrams")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the full and simplified architecture diagrams.
    Diagram(DiagramArgs),
    /// Assemble the structural model and write the model report only.
    Model(ModelArgs),
}

/// Arguments for the `diagram` command.
#[derive(Debug, Args)]
pub struct DiagramArgs {
    /// Root of the Java source tree to analyze.
    pub source_dir: PathBuf,

    /// Directory artifacts are written to.
    #[arg(long, default_value = "archmap-out")]
    pub out: PathBuf,

    /// Keep edges to types outside the analyzed tree.
    #[arg(long)]
    pub show_external: bool,

    /// Skip the delegated simplification and use the local heuristic only.
    #[arg(long)]
    pub no_simplify: bool,

    /// Collapse nodes with at most this many structural edges.
    #[arg(long, default_value_t = 2)]
    pub collapse_threshold: usize,

    /// Number of files to extract concurrently (defaults to the CPU count).
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Model used for the delegated simplification.
    #[arg(long, default_value = "claude-sonnet-4-20250514")]
    pub model: String,

    /// Timeout in seconds for one delegated simplification call.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Regex patterns for file paths to skip.
    #[arg(long)]
    pub exclude: Vec<String>,
}

impl DiagramArgs {
    /// Compiles the flags into a [`RunConfig`].
    #[must_use]
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            show_external: self.show_external,
            delegate: !self.no_simplify,
            collapse_threshold: self.collapse_threshold,
            jobs: self.jobs.unwrap_or_else(default_jobs),
            llm_model: self.model.clone(),
            llm_timeout_secs: self.timeout,
            ..RunConfig::default()
        }
    }
}

/// Arguments for the `model` command.
#[derive(Debug, Args)]
pub struct ModelArgs {
    /// Root of the Java source tree to analyze.
    pub source_dir: PathBuf,

    /// Directory the model report is written to.
    #[arg(long, default_value = "archmap-out")]
    pub out: PathBuf,

    /// Keep edges to types outside the analyzed tree.
    #[arg(long)]
    pub show_external: bool,

    /// Number of files to extract concurrently (defaults to the CPU count).
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Regex patterns for file paths to skip.
    #[arg(long)]
    pub exclude: Vec<String>,
}

impl ModelArgs {
    /// Compiles the flags into a [`RunConfig`]. The model command never
    /// calls the LLM, so delegation is off.
    #[must_use]
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            show_external: self.show_external,
            delegate: false,
            jobs: self.jobs.unwrap_or_else(default_jobs),
            ..RunConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_diagram_subcommand_with_flags() {
        let cli = Cli::parse_from([
            "archmap",
            "diagram",
            "src/main/java",
            "--no-simplify",
            "--show-external",
            "--collapse-threshold",
            "3",
            "--exclude",
            ".*Test\\.java",
        ]);
        match cli.command {
            Command::Diagram(args) => {
                assert!(args.no_simplify);
                assert!(args.show_external);
                assert_eq!(args.collapse_threshold, 3);
                assert_eq!(args.exclude, vec![".*Test\\.java"]);
                let config = args.run_config();
                assert!(!config.delegate);
                assert!(config.show_external);
            }
            Command::Model(_) => panic!("expected diagram command"),
        }
    }

    #[test]
    fn parses_model_subcommand() {
        let cli = Cli::parse_from(["archmap", "model", "."]);
        assert!(matches!(cli.command, Command::Model(_)));
    }

    #[test]
    fn rejects_missing_source_dir() {
        assert!(Cli::try_parse_from(["archmap", "diagram"]).is_err());
    }
}
