//! `archmap diagram` command: the full extract → assemble → render →
//! simplify pipeline.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::info;

use crate::assemble;
use crate::cancel::CancelToken;
use crate::cli::DiagramArgs;
use crate::config::RunConfig;
use crate::context::ServiceContext;
use crate::diagram;
use crate::pipeline;
use crate::simplify;

/// Artifact names under the output directory.
pub const FULL_DIAGRAM_FILE: &str = "architecture_full.puml";
/// Simplified diagram artifact.
pub const SIMPLIFIED_DIAGRAM_FILE: &str = "architecture_simplified_view.puml";
/// Model report artifact.
pub const MODEL_REPORT_FILE: &str = "model.yaml";

/// Execute the `diagram` command.
///
/// # Errors
///
/// Returns an error string when the source tree is unusable, no entities
/// could be extracted, or an artifact cannot be written.
pub fn run(ctx: &ServiceContext, args: &DiagramArgs) -> Result<(), String> {
    let exclude = super::compile_excludes(&args.exclude)?;
    let config = args.run_config();
    super::runtime()?.block_on(run_with_context(ctx, &args.source_dir, &args.out, &config, &exclude))
}

/// The pipeline proper, separated from runtime setup so tests can drive
/// it with stub ports.
///
/// # Errors
///
/// See [`run`].
pub async fn run_with_context(
    ctx: &ServiceContext,
    source_dir: &Path,
    out: &Path,
    config: &RunConfig,
    exclude: &[Regex],
) -> Result<(), String> {
    let cancel = CancelToken::new();
    watch_ctrl_c(&cancel);

    let files = pipeline::collect_java_files(ctx, source_dir, exclude)?;
    info!(files = files.len(), "extracting Java sources");
    let (file_models, mut diagnostics) =
        pipeline::extract_tree(ctx, &files, config.jobs, &cancel).await?;

    let (model, assembly_diagnostics) = assemble::assemble(&file_models, config);
    diagnostics.extend(assembly_diagnostics);
    if model.is_empty() {
        return Err(format!(
            "no Java types could be extracted from {}",
            source_dir.display()
        ));
    }

    let full = diagram::synthesize(&model);
    let full_text = diagram::render(&full);
    write_artifact(ctx, out, FULL_DIAGRAM_FILE, &full_text)?;

    let (reduced, simplify_diagnostics) =
        simplify::reduce(ctx.llm.as_ref(), &full, config, &cancel).await?;
    diagnostics.extend(simplify_diagnostics);
    write_artifact(ctx, out, SIMPLIFIED_DIAGRAM_FILE, &diagram::render(&reduced))?;

    let entity_count = model.entities.len();
    let edge_count = model.relationships.len();
    let report = pipeline::build_report(ctx, source_dir, model, diagnostics);
    let yaml = serde_yaml::to_string(&report)
        .map_err(|e| format!("failed to serialize model report: {e}"))?;
    write_artifact(ctx, out, MODEL_REPORT_FILE, &yaml)?;

    println!(
        "Diagrams generated: {entity_count} entities, {edge_count} edges ({} nodes / {} edges after simplification)",
        reduced.nodes.len(),
        reduced.edges.len(),
    );
    println!("Written to {}", out.display());
    report_diagnostics(&report.diagnostics);
    Ok(())
}

/// Cancels the run on Ctrl-C; extraction stops issuing work and a
/// pending delegated call aborts to the heuristic.
fn watch_ctrl_c(cancel: &CancelToken) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; finishing with work already in flight");
            cancel.cancel();
        }
    });
}

fn write_artifact(
    ctx: &ServiceContext,
    out: &Path,
    name: &str,
    contents: &str,
) -> Result<PathBuf, String> {
    let path = out.join(name);
    ctx.fs
        .write(&path, contents)
        .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    Ok(path)
}

fn report_diagnostics(diagnostics: &[crate::model::Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!("Recorded {} diagnostics:", diagnostics.len());
    for diagnostic in diagnostics {
        println!("  - {}", diagnostic.describe());
    }
}
