//! Run-level configuration compiled from CLI flags.

/// Options governing one analysis run.
///
/// Built by the command layer from CLI flags; passed read-only through
/// the pipeline.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Keep edges whose target is outside the analyzed tree.
    pub show_external: bool,
    /// Attempt the delegated (LLM) simplification before the heuristic.
    pub delegate: bool,
    /// Maximum composition+dependency degree a node may have and still be
    /// collapsed by the fallback heuristic.
    pub collapse_threshold: usize,
    /// Maximum number of files extracted concurrently.
    pub jobs: usize,
    /// Model identifier for the delegated simplification call.
    pub llm_model: String,
    /// Timeout for one delegated call, in seconds.
    pub llm_timeout_secs: u64,
    /// Attempts for the delegated call before falling back.
    pub llm_retries: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            show_external: false,
            delegate: true,
            collapse_threshold: 2,
            jobs: default_jobs(),
            llm_model: "claude-sonnet-4-20250514".to_string(),
            llm_timeout_secs: 30,
            llm_retries: 3,
        }
    }
}

/// Defaults to the machine's available parallelism.
#[must_use]
pub fn default_jobs() -> usize {
    std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
}
