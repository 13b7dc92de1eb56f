//! The workflow execution engine: interprets the declarative step sequence of
//! a meeting workflow and drives one step to completion per call.
//!
//! The engine holds no mutable state and performs no persistence. It reads an
//! [`ExecutionContext`] snapshot, dispatches to the handler for the current
//! step, and hands the outcome back to the caller, which persists messages
//! and the cursor/status update. Advancing the same meeting concurrently is
//! the caller's responsibility to prevent; different meetings are fully
//! independent.

pub mod prompts;
mod steps;

pub(crate) use steps::SPEAK_MAX_TOKENS;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::llm::{ModelPort, Usage};
use crate::core::meeting::{Agent, Meeting, MeetingStatus, MeetingWorkflow, Message, OutputStyle};

/// Snapshot assembled by the caller for one advance call. Rebuilt every time;
/// never persisted.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub meeting: Meeting,
    pub workflow: MeetingWorkflow,
    /// Participants by id; must cover every agent the current step references
    /// (absence is a handler-level error, not a crash).
    pub agents: HashMap<String, Agent>,
    pub messages: Vec<Message>,
    pub whiteboard: String,
}

/// One utterance produced by a step, with display fields denormalized for the
/// caller to persist.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GeneratedMessage {
    pub agent_id: String,
    pub agent_name: String,
    pub agent_role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_avatar_url: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// What one advance call produced. Consumed once by the caller, then
/// discarded.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub status: MeetingStatus,
    pub messages: Vec<GeneratedMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// A failed step: nothing emitted, cursor must not move, the meeting
    /// stays in progress so the step can be retried.
    fn failure(error: String) -> Self {
        Self {
            success: false,
            status: MeetingStatus::InProgress,
            messages: Vec::new(),
            error: Some(error),
        }
    }

    fn success(status: MeetingStatus, messages: Vec<GeneratedMessage>) -> Self {
        Self {
            success: true,
            status,
            messages,
            error: None,
        }
    }
}

/// Resolves an output style by id at call time. Implemented by the store;
/// injected so tests substitute a fixed map.
#[async_trait]
pub trait StyleResolver: Send + Sync {
    async fn resolve_output_style(&self, style_id: &str) -> Result<Option<OutputStyle>>;
}

pub struct WorkflowEngine {
    model: Arc<dyn ModelPort>,
    styles: Arc<dyn StyleResolver>,
}

impl WorkflowEngine {
    pub fn new(model: Arc<dyn ModelPort>, styles: Arc<dyn StyleResolver>) -> Self {
        Self { model, styles }
    }

    /// Execute the step the meeting's cursor points at. A cursor one past the
    /// end returns an already-completed empty result, so repeated calls at
    /// the end of a workflow are idempotent.
    pub async fn advance(&self, context: &ExecutionContext) -> ExecutionResult {
        let Some(step) = context.workflow.steps.get(context.meeting.current_step) else {
            return ExecutionResult::success(MeetingStatus::Completed, Vec::new());
        };
        let step = step.clone();

        use crate::core::meeting::WorkflowStep::*;
        match step {
            Speak { agent_id } => self.run_speak(&agent_id, context).await,
            ParallelSpeak { agent_ids } => self.run_parallel_speak(&agent_ids, context).await,
            Summary { agent_id } => self.run_summary(&agent_id, context).await,
            UserIntervention { label } => self.run_user_intervention(label.as_deref()),
        }
    }
}

/// Meeting-level override wins over the workflow default.
fn effective_start_prompt(context: &ExecutionContext) -> &str {
    context
        .meeting
        .start_prompt_override
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&context.workflow.start_prompt)
}

fn effective_end_prompt(context: &ExecutionContext) -> &str {
    context
        .meeting
        .end_prompt_override
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&context.workflow.end_prompt)
}

#[cfg(test)]
mod tests;
