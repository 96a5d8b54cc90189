//! Diagram reduction.
//!
//! The primary strategy delegates to the guided-simplification LLM and
//! validates whatever comes back; on any failure (malformed reply,
//! invented structure, timeout, cancellation) the deterministic
//! heuristic takes over. The delegated path may be non-deterministic;
//! the heuristic never is.

mod fallback;
mod validate;

pub use validate::validate;

use std::time::Duration;

use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::config::RunConfig;
use crate::diagram::{parse, render, DiagramDescription};
use crate::model::Diagnostic;
use crate::ports::llm::{CompletionRequest, LlmClient};

const INITIAL_RETRY_DELAY_SECS: u64 = 2;
const MAX_COMPLETION_TOKENS: u32 = 4096;

/// Produces the simplified diagram for `full`.
///
/// Attempts the delegated simplification when enabled, falling back to
/// the local heuristic otherwise. Diagnostics record why a fallback
/// happened; a successful delegated reduction records none.
///
/// # Errors
///
/// Returns an error only when the fallback heuristic itself fails
/// validation, which indicates a bug rather than bad input.
pub async fn reduce(
    llm: &dyn LlmClient,
    full: &DiagramDescription,
    config: &RunConfig,
    cancel: &CancelToken,
) -> Result<(DiagramDescription, Vec<Diagnostic>), String> {
    let mut diagnostics = Vec::new();

    if config.delegate && !cancel.is_cancelled() {
        match delegate(llm, full, config, cancel).await {
            Ok(reduced) => {
                debug!(nodes = reduced.nodes.len(), edges = reduced.edges.len(), "delegated simplification accepted");
                return Ok((reduced, diagnostics));
            }
            Err(reason) => {
                warn!(%reason, "falling back to the local reduction heuristic");
                diagnostics.push(Diagnostic::Simplification { message: reason });
            }
        }
    }

    let reduced = fallback::reduce(full, config.collapse_threshold);
    let validated = validate(full, &reduced)
        .map_err(|e| format!("fallback heuristic produced an invalid reduction: {e}"))?;
    Ok((validated, diagnostics))
}

/// One delegated simplification attempt loop: call, strip, parse, validate.
///
/// Service failures and timeouts are retried with exponential backoff; a
/// reply that parses but fails validation is not retried — a model that
/// invents structure once will usually do it again.
async fn delegate(
    llm: &dyn LlmClient,
    full: &DiagramDescription,
    config: &RunConfig,
    cancel: &CancelToken,
) -> Result<DiagramDescription, String> {
    let text = render(full);
    let request = CompletionRequest {
        model: config.llm_model.clone(),
        prompt: simplification_prompt(&text, full.nodes.len(), full.edges.len()),
        max_tokens: MAX_COMPLETION_TOKENS,
    };

    let mut last_error = "delegated simplification was not attempted".to_string();
    for attempt in 0..config.llm_retries.max(1) {
        if attempt > 0 {
            let delay = Duration::from_secs(INITIAL_RETRY_DELAY_SECS << (attempt - 1));
            debug!(attempt, ?delay, "retrying delegated simplification");
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = cancel.cancelled() => return Err("run cancelled while waiting to retry".to_string()),
            }
        }
        if cancel.is_cancelled() {
            return Err("run cancelled before the delegated call".to_string());
        }

        let call = tokio::time::timeout(
            Duration::from_secs(config.llm_timeout_secs),
            llm.complete(&request),
        );
        let outcome = tokio::select! {
            result = call => result,
            () = cancel.cancelled() => return Err("delegated call aborted by cancellation".to_string()),
        };

        match outcome {
            Err(_) => {
                last_error =
                    format!("delegated call timed out after {}s", config.llm_timeout_secs);
            }
            Ok(Err(e)) => {
                last_error = format!("delegated call failed: {e}");
            }
            Ok(Ok(response)) => {
                let body = strip_code_fences(&response.text);
                return parse(body)
                    .and_then(|candidate| validate(full, &candidate))
                    .map_err(|e| format!("reply rejected: {e}"));
            }
        }
    }
    Err(last_error)
}

fn simplification_prompt(diagram_text: &str, node_count: usize, edge_count: usize) -> String {
    format!(
        r#"The PlantUML class diagram below has {node_count} nodes and {edge_count} edges and is too cluttered to read.

Produce a simplified version that preserves the architecture:
- Keep every inheritance (<|--) and implementation (<|..) edge.
- You may drop member lines and low-signal dependency (..>) edges.
- You may merge minor classes of one package into a single node named "<package>.other" with a <<group>> stereotype listing the merged class names as members.
- Never add a class or relationship that is not in the original, and keep the same arrow notation.

Respond ONLY with the PlantUML source, no other text.

{diagram_text}"#
    )
}

/// Strips a surrounding markdown code fence from a model reply.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```plantuml")
        .or_else(|| trimmed.strip_prefix("```puml"))
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}
