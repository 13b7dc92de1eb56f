//! Step handlers. Each consumes the execution context and produces an
//! [`ExecutionResult`]; failures are converted into structured outcomes here
//! and never propagate as panics or raw errors past the engine boundary.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::prompts::{
    build_speaker_system_prompt, build_speaker_user_message, build_summary_system_prompt,
    build_summary_user_message,
};
use super::{
    ExecutionContext, ExecutionResult, GeneratedMessage, StyleResolver, WorkflowEngine,
    effective_end_prompt, effective_start_prompt,
};
use crate::core::llm::{ChatRequest, Completion, GenerationOptions, ModelPort, Usage};
use crate::core::meeting::{Agent, MeetingStatus, Message};

/// Token ceiling for an ordinary speaking turn.
pub(crate) const SPEAK_MAX_TOKENS: u32 = 4096;
/// Summaries are expected to be comprehensive, so they get a materially
/// larger ceiling.
pub(crate) const SUMMARY_MAX_TOKENS: u32 = 8192;

pub(crate) const SYSTEM_AGENT_ID: &str = "system";
pub(crate) const SYSTEM_AGENT_NAME: &str = "System";
pub(crate) const DEFAULT_INTERVENTION_PROMPT: &str =
    "Waiting for user input. Update the whiteboard, then resume the meeting.";

/// The whiteboard rides along as a separately-cacheable block, distinct from
/// the system prompt.
fn cacheable_whiteboard(whiteboard: &str) -> Option<String> {
    if whiteboard.trim().is_empty() {
        None
    } else {
        Some(whiteboard.to_string())
    }
}

fn generated(agent: &Agent, completion: Completion) -> GeneratedMessage {
    GeneratedMessage {
        agent_id: agent.id.clone(),
        agent_name: agent.name.clone(),
        agent_role: agent.role.clone(),
        agent_avatar_url: agent.avatar_url.clone(),
        content: completion.text,
        usage: Some(completion.usage),
    }
}

/// Resolve the agent's style and run one speaking turn. Shared between the
/// single-speaker handler and the parallel fan-out tasks.
async fn speak_once(
    model: Arc<dyn ModelPort>,
    styles: Arc<dyn StyleResolver>,
    agent: Agent,
    start_prompt: String,
    topic: String,
    messages: Arc<Vec<Message>>,
    whiteboard: String,
) -> Result<GeneratedMessage> {
    let style = styles
        .resolve_output_style(&agent.style_id)
        .await?
        .ok_or_else(|| anyhow!("Output style not found: {}", agent.style_id))?;

    let request = ChatRequest {
        system: build_speaker_system_prompt(&agent, &style, &start_prompt),
        user: build_speaker_user_message(&topic, &messages, &agent.role),
        cacheable_context: cacheable_whiteboard(&whiteboard),
    };
    let options = GenerationOptions {
        provider: agent.provider.clone(),
        model: agent.model.clone(),
        temperature: agent.temperature,
        max_tokens: SPEAK_MAX_TOKENS,
    };
    let completion = model
        .invoke(&request, &options)
        .await
        .map_err(|e| anyhow!("Model call failed: {e}"))?;
    Ok(generated(&agent, completion))
}

impl WorkflowEngine {
    pub(super) async fn run_speak(
        &self,
        agent_id: &str,
        context: &ExecutionContext,
    ) -> ExecutionResult {
        let Some(agent) = context.agents.get(agent_id) else {
            return ExecutionResult::failure(format!(
                "Agent not found in execution context: {agent_id}"
            ));
        };

        let outcome = speak_once(
            Arc::clone(&self.model),
            Arc::clone(&self.styles),
            agent.clone(),
            effective_start_prompt(context).to_string(),
            context.meeting.topic.clone(),
            Arc::new(context.messages.clone()),
            context.whiteboard.clone(),
        )
        .await;

        match outcome {
            Ok(message) => ExecutionResult::success(MeetingStatus::InProgress, vec![message]),
            Err(e) => ExecutionResult::failure(e.to_string()),
        }
    }

    /// All listed agents speak concurrently. The join is all-settled: agents
    /// that fail (missing agent, missing style, model error) are logged and
    /// dropped, and the step succeeds as long as at least one produced
    /// output. Results keep the agent-id list order regardless of completion
    /// order, so transcripts are deterministic.
    pub(super) async fn run_parallel_speak(
        &self,
        agent_ids: &[String],
        context: &ExecutionContext,
    ) -> ExecutionResult {
        if agent_ids.is_empty() {
            return ExecutionResult::failure(
                "parallel_speak step lists no agents".to_string(),
            );
        }

        let history = Arc::new(context.messages.clone());
        let start_prompt = effective_start_prompt(context).to_string();

        let mut set = JoinSet::new();
        for (idx, agent_id) in agent_ids.iter().enumerate() {
            let model = Arc::clone(&self.model);
            let styles = Arc::clone(&self.styles);
            let agent = context.agents.get(agent_id).cloned();
            let agent_id = agent_id.clone();
            let start_prompt = start_prompt.clone();
            let topic = context.meeting.topic.clone();
            let whiteboard = context.whiteboard.clone();
            let history = Arc::clone(&history);
            set.spawn(async move {
                let result = match agent {
                    Some(agent) => {
                        speak_once(model, styles, agent, start_prompt, topic, history, whiteboard)
                            .await
                    }
                    None => Err(anyhow!(
                        "Agent not found in execution context: {agent_id}"
                    )),
                };
                (idx, agent_id, result)
            });
        }

        let mut slots: Vec<Option<GeneratedMessage>> =
            (0..agent_ids.len()).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, _, Ok(message))) => slots[idx] = Some(message),
                Ok((_, agent_id, Err(e))) => {
                    warn!("parallel_speak: dropping agent {}: {}", agent_id, e);
                }
                Err(e) => {
                    warn!("parallel_speak: worker task failed: {}", e);
                }
            }
        }

        let messages: Vec<GeneratedMessage> = slots.into_iter().flatten().collect();
        if messages.is_empty() {
            return ExecutionResult::failure(format!(
                "All {} agents failed in parallel_speak",
                agent_ids.len()
            ));
        }

        let total = messages
            .iter()
            .filter_map(|m| m.usage)
            .fold(Usage::default(), |acc, u| Usage {
                input_tokens: acc.input_tokens + u.input_tokens,
                output_tokens: acc.output_tokens + u.output_tokens,
            });
        info!(
            "parallel_speak: {}/{} agents succeeded, input_tokens={} output_tokens={}",
            messages.len(),
            agent_ids.len(),
            total.input_tokens,
            total.output_tokens
        );
        ExecutionResult::success(MeetingStatus::InProgress, messages)
    }

    /// The summarizing agent closes the meeting. The meeting-level
    /// `summary_agent_id` override wins over the step's configured agent; the
    /// effective end instructions follow the same override rule. Failure
    /// leaves the meeting in progress so the step can be retried.
    pub(super) async fn run_summary(
        &self,
        step_agent_id: &str,
        context: &ExecutionContext,
    ) -> ExecutionResult {
        let summarizer_id = context
            .meeting
            .summary_agent_id
            .as_deref()
            .unwrap_or(step_agent_id);
        let Some(agent) = context.agents.get(summarizer_id) else {
            return ExecutionResult::failure(format!(
                "Summary agent not found in execution context: {summarizer_id}"
            ));
        };

        let style = match self.styles.resolve_output_style(&agent.style_id).await {
            Ok(Some(style)) => style,
            Ok(None) => {
                return ExecutionResult::failure(format!(
                    "Output style not found: {}",
                    agent.style_id
                ));
            }
            Err(e) => {
                return ExecutionResult::failure(format!("Output style lookup failed: {e}"));
            }
        };

        let request = ChatRequest {
            system: build_summary_system_prompt(agent, &style, effective_end_prompt(context)),
            user: build_summary_user_message(&context.meeting.topic, &context.messages),
            cacheable_context: cacheable_whiteboard(&context.whiteboard),
        };
        let options = GenerationOptions {
            provider: agent.provider.clone(),
            model: agent.model.clone(),
            temperature: agent.temperature,
            max_tokens: SUMMARY_MAX_TOKENS,
        };

        match self.model.invoke(&request, &options).await {
            Ok(completion) => ExecutionResult::success(
                MeetingStatus::Completed,
                vec![generated(agent, completion)],
            ),
            Err(e) => ExecutionResult::failure(format!("Summary generation failed: {e}")),
        }
    }

    /// No model call: emit a system-authored message carrying the step label
    /// and pause the meeting until the user resumes it.
    pub(super) fn run_user_intervention(&self, label: Option<&str>) -> ExecutionResult {
        let content = label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(DEFAULT_INTERVENTION_PROMPT)
            .to_string();
        ExecutionResult::success(
            MeetingStatus::Waiting,
            vec![GeneratedMessage {
                agent_id: SYSTEM_AGENT_ID.to_string(),
                agent_name: SYSTEM_AGENT_NAME.to_string(),
                agent_role: SYSTEM_AGENT_ID.to_string(),
                agent_avatar_url: None,
                content,
                usage: None,
            }],
        )
    }
}
