//! The engine-driving caller: assembles the execution context from the
//! store, invokes the engine, and persists the outcome. The engine itself
//! never persists anything.
//!
//! Advances for one meeting must be serialized by the layer calling into the
//! runner (one in-flight request per meeting id); advances for different
//! meetings are independent.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use tracing::info;

use crate::core::engine::{ExecutionContext, GeneratedMessage, SPEAK_MAX_TOKENS, WorkflowEngine};
use crate::core::llm::{ChatRequest, Completion, GenerationOptions, ModelPort};
use crate::core::meeting::{
    Agent, Meeting, MeetingStatus, WorkflowStep, can_transition,
};
use crate::core::store::{MeetingStore, NewMessage};

const MEETING_STARTED_MESSAGE: &str = "Meeting started.";

/// What one successful advance did, shaped for API responses.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AdvanceReport {
    pub current_step: usize,
    pub total_steps: usize,
    pub status: MeetingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_step: Option<WorkflowStep>,
    pub messages: Vec<GeneratedMessage>,
}

pub struct MeetingRunner {
    store: Arc<MeetingStore>,
    engine: WorkflowEngine,
    model: Arc<dyn ModelPort>,
}

impl MeetingRunner {
    pub fn new(store: Arc<MeetingStore>, model: Arc<dyn ModelPort>) -> Self {
        let engine = WorkflowEngine::new(Arc::clone(&model), store.clone());
        Self {
            store,
            engine,
            model,
        }
    }

    /// pending → in_progress, with the system "meeting started" message.
    pub async fn start(&self, meeting_id: &str) -> Result<Meeting> {
        let meeting = self.require_meeting(meeting_id).await?;
        if meeting.status != MeetingStatus::Pending
            || !can_transition(meeting.status, MeetingStatus::InProgress)
        {
            bail!(
                "Meeting cannot be started from status \"{}\"",
                meeting.status.as_str()
            );
        }

        self.store
            .append_message(&NewMessage {
                meeting_id: meeting.id.clone(),
                agent_id: "system".to_string(),
                agent_name: "System".to_string(),
                agent_role: Some("system".to_string()),
                step_number: Some(0),
                agent_avatar_url: None,
                content: MEETING_STARTED_MESSAGE.to_string(),
            })
            .await?;
        self.store
            .set_meeting_status(&meeting.id, MeetingStatus::InProgress)
            .await?;
        info!("Meeting {} started", meeting.id);
        self.require_meeting(meeting_id).await
    }

    /// Execute the step the cursor points at. The cursor and status are
    /// persisted only when the step succeeds, so a failed call leaves the
    /// meeting untouched and safely retryable.
    pub async fn run_next(&self, meeting_id: &str) -> Result<AdvanceReport> {
        let meeting = self.require_meeting(meeting_id).await?;
        match meeting.status {
            MeetingStatus::InProgress => {}
            MeetingStatus::Pending => bail!("Meeting has not been started"),
            MeetingStatus::Waiting => {
                bail!("Meeting is waiting for user intervention; resume it instead")
            }
            MeetingStatus::Completed => bail!("Meeting already completed"),
            MeetingStatus::Error => bail!("Meeting is in an error state"),
        }
        self.advance_once(meeting).await
    }

    /// waiting → in_progress (optionally replacing the whiteboard first),
    /// then immediately advance one step.
    pub async fn resume(
        &self,
        meeting_id: &str,
        whiteboard: Option<String>,
    ) -> Result<AdvanceReport> {
        let mut meeting = self.require_meeting(meeting_id).await?;
        if meeting.status != MeetingStatus::Waiting {
            bail!("Meeting is not waiting for user intervention");
        }

        if let Some(whiteboard) = whiteboard {
            self.store
                .update_meeting_whiteboard(&meeting.id, &whiteboard)
                .await?;
            meeting.whiteboard = whiteboard;
        }
        self.store
            .set_meeting_status(&meeting.id, MeetingStatus::InProgress)
            .await?;
        meeting.status = MeetingStatus::InProgress;

        self.advance_once(meeting).await
    }

    /// One-shot debug call: no meeting, no persistence, just the agent's
    /// configured model answering a single prompt.
    pub async fn one_shot_chat(
        &self,
        agent: &Agent,
        message: &str,
        context_text: Option<&str>,
    ) -> Result<Completion> {
        let system = agent
            .prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| {
                format!(
                    "You are {}, the {}. {}",
                    agent.name, agent.role, agent.persona
                )
            });
        let user = match context_text {
            Some(context) => format!(
                "The discussion so far:\n{}\n\nRespond in your role as the {}.\nTopic: {}",
                context, agent.role, message
            ),
            None => message.to_string(),
        };
        self.model
            .invoke(
                &ChatRequest {
                    system,
                    user,
                    cacheable_context: None,
                },
                &GenerationOptions {
                    provider: agent.provider.clone(),
                    model: agent.model.clone(),
                    temperature: agent.temperature,
                    max_tokens: SPEAK_MAX_TOKENS,
                },
            )
            .await
    }

    async fn require_meeting(&self, meeting_id: &str) -> Result<Meeting> {
        self.store
            .get_meeting(meeting_id)
            .await?
            .ok_or_else(|| anyhow!("Meeting not found: {meeting_id}"))
    }

    async fn advance_once(&self, meeting: Meeting) -> Result<AdvanceReport> {
        let workflow = self
            .store
            .get_workflow(&meeting.workflow_id)
            .await?
            .ok_or_else(|| anyhow!("Workflow not found: {}", meeting.workflow_id))?;

        // Workflow participants plus the meeting's summary override plus any
        // agent a step names directly, deduplicated in order. Ids that no
        // longer resolve are left out; the handler reports them.
        let mut wanted: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let want = |id: &str, wanted: &mut Vec<String>, seen: &mut HashSet<String>| {
            if seen.insert(id.to_string()) {
                wanted.push(id.to_string());
            }
        };
        for id in &workflow.agent_ids {
            want(id, &mut wanted, &mut seen);
        }
        for step in &workflow.steps {
            for id in step.referenced_agent_ids() {
                want(id, &mut wanted, &mut seen);
            }
        }
        if let Some(id) = &meeting.summary_agent_id {
            want(id, &mut wanted, &mut seen);
        }

        let mut agents = HashMap::new();
        for id in wanted {
            if let Some(agent) = self.store.get_agent(&id).await? {
                agents.insert(id, agent);
            }
        }

        let messages = self.store.list_messages(&meeting.id).await?;
        let context = ExecutionContext {
            whiteboard: meeting.whiteboard.clone(),
            meeting,
            workflow,
            agents,
            messages,
        };

        let result = self.engine.advance(&context).await;
        if !result.success {
            return Err(anyhow!(
                "{}",
                result
                    .error
                    .unwrap_or_else(|| "step execution failed".to_string())
            ));
        }

        let meeting = &context.meeting;
        let workflow = &context.workflow;
        // A cursor already past the end means the engine returned the
        // idempotent completed guard; the cursor must not move again.
        let at_end = meeting.current_step >= workflow.steps.len();
        let next_step = if at_end {
            meeting.current_step
        } else {
            meeting.current_step + 1
        };

        for message in &result.messages {
            self.store
                .append_message(&NewMessage {
                    meeting_id: meeting.id.clone(),
                    agent_id: message.agent_id.clone(),
                    agent_name: message.agent_name.clone(),
                    agent_role: Some(message.agent_role.clone()),
                    step_number: Some(next_step),
                    agent_avatar_url: message.agent_avatar_url.clone(),
                    content: message.content.clone(),
                })
                .await?;
        }

        let final_conclusion = if result.status == MeetingStatus::Completed {
            result.messages.first().map(|m| m.content.as_str())
        } else {
            None
        };
        self.store
            .apply_advance(&meeting.id, next_step, result.status, final_conclusion)
            .await?;

        info!(
            "Meeting {} advanced to step {}/{} ({})",
            meeting.id,
            next_step,
            workflow.steps.len(),
            result.status.as_str()
        );
        Ok(AdvanceReport {
            current_step: next_step,
            total_steps: workflow.steps.len(),
            status: result.status,
            executed_step: workflow.steps.get(meeting.current_step).cloned(),
            messages: result.messages,
        })
    }
}
