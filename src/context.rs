//! Service context bundling all port trait objects.

use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::llm::LlmClient;

/// Bundles the port trait objects for one run.
///
/// Each field provides access to one external boundary. Commands build a
/// live context; tests build the struct directly with stub adapters.
pub struct ServiceContext {
    /// Clock for stamping the model report.
    pub clock: Box<dyn Clock>,
    /// Filesystem for source reads and artifact writes.
    pub fs: Box<dyn FileSystem>,
    /// LLM client for the guided simplification.
    pub llm: Box<dyn LlmClient>,
}

impl ServiceContext {
    /// Creates a context with real adapters for every port.
    #[must_use]
    pub fn live() -> Self {
        use crate::adapters::anthropic::AnthropicClient;
        use crate::adapters::disk::DiskFileSystem;
        use crate::adapters::system::SystemClock;

        Self {
            clock: Box::new(SystemClock),
            fs: Box::new(DiskFileSystem),
            llm: Box::new(AnthropicClient::new()),
        }
    }
}
