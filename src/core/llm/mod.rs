pub mod providers;
mod retry;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::core::config::Config;
use providers::{AnthropicProvider, GoogleProvider, OpenAiProvider};

/// Wall-clock budget for a single provider attempt.
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// A rendered prompt ready for one model invocation. `cacheable_context`
/// (the meeting whiteboard) is kept separate from the system prompt so
/// backends that support prompt caching can skip re-encoding it.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub cacheable_context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Usage,
}

/// The engine's single opaque capability: render text from a prompt, or fail.
/// Retry, backoff, and timeouts live behind this seam.
#[async_trait]
pub trait ModelPort: Send + Sync {
    async fn invoke(&self, request: &ChatRequest, options: &GenerationOptions)
    -> Result<Completion>;
}

/// One concrete backend (OpenAI, Anthropic, Google). Providers are plain
/// structs constructed with their API key — no process-wide client state.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn provider_id(&self) -> &str;

    async fn complete(
        &self,
        request: &ChatRequest,
        options: &GenerationOptions,
    ) -> Result<Completion>;
}

/// Routes invocations to the registered provider named in the options, and
/// wraps every attempt in a timeout plus retry with exponential backoff.
pub struct LlmRouter {
    providers: Vec<Box<dyn LlmProvider>>,
    call_timeout: Duration,
}

impl LlmRouter {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            call_timeout: CALL_TIMEOUT,
        }
    }

    /// Register every provider the config carries an API key for.
    pub fn from_config(config: &Config) -> Self {
        let mut router = Self::new();
        if let Some(key) = config.api_key("openai") {
            router.register_provider(Box::new(OpenAiProvider::new(key)));
        }
        if let Some(key) = config.api_key("anthropic") {
            router.register_provider(Box::new(AnthropicProvider::new(key)));
        }
        if let Some(key) = config.api_key("google") {
            router.register_provider(Box::new(GoogleProvider::new(key)));
        }
        router
    }

    pub fn register_provider(&mut self, provider: Box<dyn LlmProvider>) {
        info!("Registered LLM provider: {}", provider.provider_id());
        self.providers.push(provider);
    }

    pub fn get_provider(&self, id: &str) -> Option<&dyn LlmProvider> {
        self.providers
            .iter()
            .find(|p| p.provider_id().eq_ignore_ascii_case(id))
            .map(|p| p.as_ref())
    }

    pub fn list_providers(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|p| p.provider_id().to_string())
            .collect()
    }
}

impl Default for LlmRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelPort for LlmRouter {
    async fn invoke(
        &self,
        request: &ChatRequest,
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let provider = self.get_provider(&options.provider).ok_or_else(|| {
            anyhow::anyhow!("No LLM provider registered for \"{}\"", options.provider)
        })?;

        let completion = retry::with_retry(|| async {
            match tokio::time::timeout(self.call_timeout, provider.complete(request, options)).await
            {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!(
                    "{} call timed out after {}s",
                    options.provider,
                    self.call_timeout.as_secs()
                )),
            }
        })
        .await?;

        info!(
            "[llm] {}/{} input_tokens={} output_tokens={} cacheable_context={}",
            options.provider,
            options.model,
            completion.usage.input_tokens,
            completion.usage.output_tokens,
            request
                .cacheable_context
                .as_deref()
                .map(str::len)
                .unwrap_or(0)
        );
        Ok(completion)
    }
}
