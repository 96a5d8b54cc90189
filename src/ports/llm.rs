//! LLM port for the guided-simplification capability.
//!
//! The pipeline treats the model as an opaque text-to-text function:
//! prompt in, text out, may fail transiently. Replies are untrusted and
//! always pass the structural validation gate before use.

use std::future::Future;
use std::pin::Pin;

use super::BoxedError;

/// Boxed future alias keeping [`LlmClient`] dyn-compatible.
pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CompletionResponse, BoxedError>> + Send + 'a>>;

/// One completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier, from `RunConfig::llm_model`.
    pub model: String,
    /// The full prompt text.
    pub prompt: String,
    /// Generation cap.
    pub max_tokens: u32,
}

/// One completion reply.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The generated text, possibly fenced in markdown.
    pub text: String,
    /// Prompt tokens consumed.
    pub prompt_tokens: u32,
    /// Completion tokens generated.
    pub completion_tokens: u32,
}

/// Sends completion requests to a language model.
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error on any transport or service failure; callers
    /// retry or fall back, they never propagate this as fatal.
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_>;
}
