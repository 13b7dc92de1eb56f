//! Shared fixtures: a stub model port, a fixed style resolver, and context
//! builders.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::engine::{ExecutionContext, StyleResolver, WorkflowEngine};
use crate::core::llm::{ChatRequest, Completion, GenerationOptions, ModelPort, Usage};
use crate::core::meeting::{
    Agent, Meeting, MeetingStatus, MeetingWorkflow, OutputStyle, WorkflowStep,
};

pub(crate) const SHARED_STYLE_ID: &str = "shared-style";

/// Counts invocations, optionally fails for chosen model ids, and records the
/// last request so prompts and cacheable context can be asserted on.
pub(crate) struct StubModelPort {
    calls: AtomicUsize,
    fail_models: Vec<String>,
    /// `Some` replies with a fixed string, `None` echoes the model id.
    reply: Option<String>,
    pub last_request: Mutex<Option<ChatRequest>>,
    pub last_options: Mutex<Option<GenerationOptions>>,
}

impl StubModelPort {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_models: Vec::new(),
            reply: Some(reply.to_string()),
            last_request: Mutex::new(None),
            last_options: Mutex::new(None),
        })
    }

    pub fn echoing_model() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_models: Vec::new(),
            reply: None,
            last_request: Mutex::new(None),
            last_options: Mutex::new(None),
        })
    }

    pub fn failing_for(fail_models: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_models: fail_models.iter().map(|m| m.to_string()).collect(),
            reply: None,
            last_request: Mutex::new(None),
            last_options: Mutex::new(None),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelPort for StubModelPort {
    async fn invoke(
        &self,
        request: &ChatRequest,
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().await = Some(request.clone());
        *self.last_options.lock().await = Some(options.clone());
        if self.fail_models.iter().any(|m| m == &options.model) {
            anyhow::bail!("stub failure for {}", options.model);
        }
        Ok(Completion {
            text: self
                .reply
                .clone()
                .unwrap_or_else(|| options.model.clone()),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
            },
        })
    }
}

pub(crate) struct StubStyles {
    styles: HashMap<String, OutputStyle>,
}

impl StubStyles {
    pub fn with_shared_style() -> Arc<Self> {
        let mut styles = HashMap::new();
        styles.insert(
            SHARED_STYLE_ID.to_string(),
            OutputStyle {
                id: SHARED_STYLE_ID.to_string(),
                name: "Shared".to_string(),
                prompt_segment: "Keep it short.".to_string(),
                description: String::new(),
                is_active: true,
            },
        );
        Arc::new(Self { styles })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            styles: HashMap::new(),
        })
    }
}

#[async_trait]
impl StyleResolver for StubStyles {
    async fn resolve_output_style(&self, style_id: &str) -> Result<Option<OutputStyle>> {
        Ok(self.styles.get(style_id).cloned())
    }
}

pub(crate) fn agent(id: &str) -> Agent {
    Agent {
        id: id.to_string(),
        name: format!("{id}-name"),
        role: format!("{id}-role"),
        avatar_url: None,
        persona: "Test persona.".to_string(),
        prompt: None,
        style_id: SHARED_STYLE_ID.to_string(),
        provider: "stub".to_string(),
        model: format!("{id}-model"),
        temperature: 0.7,
    }
}

pub(crate) fn context(
    steps: Vec<WorkflowStep>,
    agents: Vec<Agent>,
    current_step: usize,
) -> ExecutionContext {
    let agent_ids: Vec<String> = agents.iter().map(|a| a.id.clone()).collect();
    ExecutionContext {
        meeting: Meeting {
            id: "m-1".to_string(),
            title: "Test meeting".to_string(),
            topic: "Topic under test".to_string(),
            whiteboard: String::new(),
            workflow_id: "wf-1".to_string(),
            current_step,
            status: MeetingStatus::InProgress,
            start_prompt_override: None,
            end_prompt_override: None,
            summary_agent_id: None,
            final_conclusion: None,
            created_at: String::new(),
            completed_at: None,
        },
        workflow: MeetingWorkflow {
            id: "wf-1".to_string(),
            name: "Test workflow".to_string(),
            description: String::new(),
            start_prompt: "Stay on topic.".to_string(),
            end_prompt: "Wrap up with decisions.".to_string(),
            agent_ids,
            steps,
            is_active: true,
        },
        agents: agents.into_iter().map(|a| (a.id.clone(), a)).collect(),
        messages: Vec::new(),
        whiteboard: String::new(),
    }
}

pub(crate) fn engine(
    port: &Arc<StubModelPort>,
    styles: &Arc<StubStyles>,
) -> WorkflowEngine {
    WorkflowEngine::new(
        Arc::clone(port) as Arc<dyn ModelPort>,
        Arc::clone(styles) as Arc<dyn StyleResolver>,
    )
}
