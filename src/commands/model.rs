//! `archmap model` command: assemble the structural model and write the
//! report without rendering diagrams.

use std::path::Path;

use regex::Regex;
use tracing::info;

use crate::assemble;
use crate::cancel::CancelToken;
use crate::cli::ModelArgs;
use crate::config::RunConfig;
use crate::context::ServiceContext;
use crate::pipeline;

use super::diagram::MODEL_REPORT_FILE;

/// Execute the `model` command.
///
/// # Errors
///
/// Returns an error string when the source tree is unusable, no entities
/// could be extracted, or the report cannot be written.
pub fn run(ctx: &ServiceContext, args: &ModelArgs) -> Result<(), String> {
    let exclude = super::compile_excludes(&args.exclude)?;
    let config = args.run_config();
    super::runtime()?.block_on(run_with_context(ctx, &args.source_dir, &args.out, &config, &exclude))
}

/// The assembly pipeline, separated from runtime setup for tests.
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

    let report = pipeline::build_report(ctx, source_dir, model, diagnostics);
    let yaml = serde_yaml::to_string(&report)
        .map_err(|e| format!("failed to serialize model report: {e}"))?;
    let path = out.join(MODEL_REPORT_FILE);
    ctx.fs
        .write(&path, &yaml)
        .map_err(|e| format!("failed to write {}: {e}", path.display()))?;

    println!(
        "Model assembled: {} entities, {} relationships, {} diagnostics",
        report.entity_count,
        report.relationship_count,
        report.diagnostics.len(),
    );
    println!("Written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ServiceContext;
    use crate::model::ModelReport;

    fn temp_tree(name: &str, files: &[(&str, &str)]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        for (path, content) in files {
            let full = dir.join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn writes_a_loadable_model_report() {
        let dir = temp_tree(
            "archmap_cmd_model_test",
            &[
                ("Animal.java", "package com.app;\npublic class Animal {}\n"),
                ("Bad.java", "public class { nope"),
            ],
        );
        let out = dir.join("out");
        let ctx = ServiceContext::live();
        let config = RunConfig { delegate: false, ..RunConfig::default() };

        run_with_context(&ctx, &dir, &out, &config, &[]).await.unwrap();

        let yaml = std::fs::read_to_string(out.join(MODEL_REPORT_FILE)).unwrap();
        let report: ModelReport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(report.entity_count, 1);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.model.entities.contains_key("com.app.Animal"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
