//! Port traits defining external boundaries.
//!
//! The pipeline core touches three external systems: the disk (source
//! reads, artifact writes), the wall clock (report stamps), and the
//! guided-simplification LLM. Each gets a trait here; the real
//! implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod llm;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use llm::{CompletionFuture, CompletionRequest, CompletionResponse, LlmClient};

/// Error type shared by all port signatures.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;
