use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::CONTEXT_HEADER;
use crate::core::llm::{ChatRequest, Completion, GenerationOptions, LlmProvider, Usage};

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<SystemBlock>,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct SystemBlock {
    #[serde(rename = "type")]
    block_type: &'static str,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_control: Option<CacheControl>,
}

#[derive(Serialize)]
struct CacheControl {
    #[serde(rename = "type")]
    control_type: &'static str,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
    #[serde(default)]
    cache_read_input_tokens: u64,
}

pub struct AnthropicProvider {
    api_key: String,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_id(&self) -> &str {
        "anthropic"
    }

    async fn complete(
        &self,
        request: &ChatRequest,
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let mut system = Vec::new();
        // The stable context block is marked ephemeral-cacheable and placed
        // ahead of the per-agent system prompt.
        if let Some(context) = &request.cacheable_context {
            system.push(SystemBlock {
                block_type: "text",
                text: format!("{CONTEXT_HEADER}\n\n{context}"),
                cache_control: Some(CacheControl {
                    control_type: "ephemeral",
                }),
            });
        }
        if !request.system.is_empty() {
            system.push(SystemBlock {
                block_type: "text",
                text: request.system.clone(),
                cache_control: None,
            });
        }

        let req = AnthropicRequest {
            model: &options.model,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: request.user.clone(),
            }],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let res = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&req)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(anyhow!(
                "Anthropic API error ({}): {}",
                res.status().as_u16(),
                res.text().await.unwrap_or_default()
            ));
        }
        let parsed: AnthropicResponse = res.json().await?;
        if parsed.usage.cache_read_input_tokens > 0 {
            tracing::debug!(
                "anthropic cache hit: {} tokens read",
                parsed.usage.cache_read_input_tokens
            );
        }
        let text = parsed
            .content
            .into_iter()
            .find(|b| b.block_type == "text")
            .map(|b| b.text)
            .unwrap_or_default();
        Ok(Completion {
            text,
            usage: Usage {
                input_tokens: parsed.usage.input_tokens,
                output_tokens: parsed.usage.output_tokens,
            },
        })
    }
}
