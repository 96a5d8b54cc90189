//! Run orchestration shared by the `diagram` and `model` commands:
//! source-tree traversal, bounded parallel extraction, and the model
//! report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::context::ServiceContext;
use crate::extract::{self, FileModel};
use crate::model::{Diagnostic, GlobalModel, ModelReport};

/// Collects the `*.java` files under `root`, sorted by path.
///
/// Files whose path matches any of the `exclude` patterns are skipped,
/// matching anywhere in the path like the usual search semantics.
///
/// # Errors
///
/// Returns an error when `root` is not a directory or a directory listing
/// fails.
pub fn collect_java_files(
    ctx: &ServiceContext,
    root: &Path,
    exclude: &[Regex],
) -> Result<Vec<PathBuf>, String> {
    if !ctx.fs.is_dir(root) {
        return Err(format!("source directory not found: {}", root.display()));
    }

    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = ctx
            .fs
            .list_dir(&dir)
            .map_err(|e| format!("failed to list {}: {e}", dir.display()))?;
        for name in entries {
            let path = dir.join(&name);
            if ctx.fs.is_dir(&path) {
                stack.push(path);
            } else if name.ends_with(".java") {
                let path_str = path.to_string_lossy().to_string();
                if exclude.iter().any(|p| p.is_match(&path_str)) {
                    debug!(path = %path_str, "skipping excluded file");
                    continue;
                }
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Extracts every file concurrently, bounded by `jobs` parallel parses.
///
/// Results are merged in path order regardless of completion order, so
/// the downstream model is independent of scheduling. Cancellation stops
/// new work from being issued; files already in flight finish.
///
/// # Errors
///
/// Returns an error when a worker task panics. Per-file parse failures
/// are diagnostics, not errors.
pub async fn extract_tree(
    ctx: &ServiceContext,
    files: &[PathBuf],
    jobs: usize,
    cancel: &CancelToken,
) -> Result<(Vec<FileModel>, Vec<Diagnostic>), String> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut diagnostics = Vec::new();
    let mut handles = Vec::new();

    for path in files {
        if cancel.is_cancelled() {
            info!("cancellation requested; skipping remaining files");
            break;
        }
        let display = path.to_string_lossy().to_string();
        let content = match ctx.fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                diagnostics.push(Diagnostic::ParseFailure {
                    path: display,
                    message: format!("could not read file: {e}"),
                });
                continue;
            }
        };
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| format!("extraction pool closed unexpectedly: {e}"))?;
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            extract::extract(&display, &content)
        }));
    }

    let mut models = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(Ok(file_model)) => models.push(file_model),
            Ok(Err(diagnostic)) => diagnostics.push(diagnostic),
            Err(e) => return Err(format!("extraction worker failed: {e}")),
        }
    }
    Ok((models, diagnostics))
}

/// Builds the `model.yaml` report for an assembled model.
#[must_use]
pub fn build_report(
    ctx: &ServiceContext,
    root: &Path,
    model: GlobalModel,
    diagnostics: Vec<Diagnostic>,
) -> ModelReport {
    ModelReport {
        root: root.to_string_lossy().to_string(),
        generated_at: ctx.clock.now(),
        entity_count: model.entities.len(),
        relationship_count: model.relationships.len(),
        model,
        diagnostics,
    }
}
