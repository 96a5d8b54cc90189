//! Core library entry for the `archmap` CLI.
//!
//! The pipeline: `extract` parses each Java file into entities and raw
//! relationship hints, `assemble` merges them into one global model,
//! `diagram` renders the model as deterministic PlantUML, and `simplify`
//! produces the reduced view (delegated to an LLM when enabled, a local
//! heuristic otherwise). External boundaries live behind `ports`.

pub mod adapters;
pub mod assemble;
pub mod cancel;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod diagram;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod ports;
pub mod simplify;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    dotenvy::dotenv().ok();
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["archmap", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_errors_on_missing_source_dir() {
        let result = run(["archmap", "model", "/definitely/not/a/real/dir"]);
        assert!(result.is_err());
    }
}
