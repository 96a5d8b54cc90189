//! Anthropic messages API adapter for the `LlmClient` port.

use std::env;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ports::llm::{CompletionFuture, CompletionRequest, CompletionResponse, LlmClient};
use crate::ports::BoxedError;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Calls the Anthropic messages API for the guided simplification.
///
/// The key is read from `ANTHROPIC_API_KEY` at call time; `run` loads a
/// `.env` file at startup so the key can live there.
pub struct AnthropicClient {
    http: Client,
}

impl AnthropicClient {
    /// Creates a client with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self { http: Client::new() }
    }
}

impl Default for AnthropicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Turn<'a>; 1],
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesReply {
    content: Vec<ReplyBlock>,
    usage: ReplyUsage,
}

#[derive(Deserialize)]
struct ReplyBlock {
    text: String,
}

#[derive(Deserialize)]
struct ReplyUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Envelope the API wraps non-2xx replies in.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn fail(message: String) -> BoxedError {
    message.into()
}

impl LlmClient for AnthropicClient {
    fn complete(&self, request: &CompletionRequest) -> CompletionFuture<'_> {
        let model = request.model.clone();
        let prompt = request.prompt.clone();
        let max_tokens = request.max_tokens;

        Box::pin(async move {
            let key = env::var("ANTHROPIC_API_KEY")
                .map_err(|_| fail("ANTHROPIC_API_KEY is not set".to_string()))?;

            let body = MessagesBody {
                model: &model,
                max_tokens,
                messages: [Turn { role: "user", content: &prompt }],
            };
            let response = self
                .http
                .post(MESSAGES_URL)
                .header("x-api-key", &key)
                .header("anthropic-version", API_VERSION)
                .json(&body)
                .send()
                .await
                .map_err(|e| fail(format!("request to the Anthropic API failed: {e}")))?;

            let status = response.status();
            let raw = response
                .text()
                .await
                .map_err(|e| fail(format!("could not read the Anthropic API reply: {e}")))?;

            if !status.is_success() {
                let detail = serde_json::from_str::<ErrorEnvelope>(&raw)
                    .map_or(raw, |envelope| envelope.error.message);
                return Err(fail(format!("Anthropic API returned {status}: {detail}")));
            }

            let reply: MessagesReply = serde_json::from_str(&raw)
                .map_err(|e| fail(format!("malformed Anthropic API reply: {e}")))?;
            let text: String = reply.content.into_iter().map(|block| block.text).collect();

            Ok(CompletionResponse {
                text,
                prompt_tokens: reply.usage.input_tokens,
                completion_tokens: reply.usage.output_tokens,
            })
        })
    }
}
