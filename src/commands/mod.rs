//! Command dispatch and handlers.

pub mod diagram;
pub mod model;

use regex::Regex;

use crate::cli::Command;
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let ctx = ServiceContext::live();
    match command {
        Command::Diagram(args) => diagram::run(&ctx, args),
        Command::Model(args) => model::run(&ctx, args),
    }
}

/// Compiles `--exclude` patterns, failing fast on an invalid regex.
pub(crate) fn compile_excludes(patterns: &[String]) -> Result<Vec<Regex>, String> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| format!("invalid exclude pattern {p}: {e}")))
        .collect()
}

/// Builds the tokio runtime a command runs its pipeline on.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))
}

#[cfg(test)]
mod tests {
    use super::compile_excludes;

    #[test]
    fn compiles_valid_patterns() {
        let patterns = vec![".*Test\\.java".to_string(), "build/.*".to_string()];
        assert_eq!(compile_excludes(&patterns).unwrap().len(), 2);
    }

    #[test]
    fn reports_invalid_pattern() {
        let err = compile_excludes(&["(".to_string()]).unwrap_err();
        assert!(err.contains("invalid exclude pattern"));
    }
}
