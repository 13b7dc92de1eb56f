use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::CONTEXT_HEADER;
use crate::core::llm::{ChatRequest, Completion, GenerationOptions, LlmProvider, Usage};

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessageOwned,
}

#[derive(Deserialize)]
struct OpenAiMessageOwned {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

pub struct OpenAiProvider {
    api_key: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: Client::new(),
        }
    }
}

/// Reasoning models reject the `system` role and a temperature parameter.
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("o1-") || model.starts_with("o3-") || model.starts_with("gpt-5")
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn provider_id(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        request: &ChatRequest,
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let instruction_role = if is_reasoning_model(&options.model) {
            "developer"
        } else {
            "system"
        };

        let mut messages = Vec::new();
        // OpenAI caches by prefix match, so the stable context block goes first.
        if let Some(context) = &request.cacheable_context {
            messages.push(OpenAiMessage {
                role: instruction_role,
                content: format!("{CONTEXT_HEADER}\n\n{context}"),
            });
        }
        if !request.system.is_empty() {
            messages.push(OpenAiMessage {
                role: instruction_role,
                content: request.system.clone(),
            });
        }
        messages.push(OpenAiMessage {
            role: "user",
            content: request.user.clone(),
        });

        let req = OpenAiRequest {
            model: &options.model,
            messages,
            max_completion_tokens: options.max_tokens,
            temperature: if is_reasoning_model(&options.model) {
                None
            } else {
                Some(options.temperature)
            },
        };

        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&req)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(anyhow!(
                "OpenAI API error ({}): {}",
                res.status().as_u16(),
                res.text().await.unwrap_or_default()
            ));
        }
        let parsed: OpenAiResponse = res.json().await?;
        let usage = parsed
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        Ok(Completion { text, usage })
    }
}
