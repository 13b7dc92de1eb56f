//! Drives a full meeting through the runner against a stub model port:
//! start, a speaking round, a parallel round with one failing participant,
//! a user-intervention pause, and the concluding summary.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;

use quorum::core::llm::{ChatRequest, Completion, GenerationOptions, ModelPort, Usage};
use quorum::core::meeting::{MeetingStatus, WorkflowStep};
use quorum::core::runner::MeetingRunner;
use quorum::core::store::{
    MeetingStore, NewAgent, NewMeeting, NewOutputStyle, NewWorkflow,
};

struct StubPort {
    calls: AtomicUsize,
    fail_model: Option<String>,
}

#[async_trait]
impl ModelPort for StubPort {
    async fn invoke(
        &self,
        _request: &ChatRequest,
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_model.as_deref() == Some(options.model.as_str()) {
            anyhow::bail!("stub failure for {}", options.model);
        }
        Ok(Completion {
            text: format!("reply from {}", options.model),
            usage: Usage {
                input_tokens: 20,
                output_tokens: 10,
            },
        })
    }
}

async fn create_agent(store: &MeetingStore, name: &str, style_id: &str, model: &str) -> String {
    store
        .create_agent(&NewAgent {
            name: name.to_string(),
            role: format!("{name} role"),
            avatar_url: None,
            persona: format!("{name} persona."),
            prompt: None,
            style_id: style_id.to_string(),
            provider: "stub".to_string(),
            model: model.to_string(),
            temperature: 0.7,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn meeting_runs_from_start_to_conclusion() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        MeetingStore::open(dir.path().join("quorum.db"))
            .await
            .unwrap(),
    );

    let style = store
        .create_output_style(&NewOutputStyle {
            name: "Plain".to_string(),
            prompt_segment: "Plain prose.".to_string(),
            description: String::new(),
            is_active: true,
        })
        .await
        .unwrap();

    let alice = create_agent(&store, "Alice", &style.id, "model-alice").await;
    let bob = create_agent(&store, "Bob", &style.id, "model-bob").await;
    let cora = create_agent(&store, "Cora", &style.id, "model-cora").await;

    let workflow = store
        .create_workflow(&NewWorkflow {
            name: "Full flow".to_string(),
            description: String::new(),
            start_prompt: "Stay constructive.".to_string(),
            end_prompt: "Summarize the decisions.".to_string(),
            agent_ids: vec![alice.clone(), bob.clone(), cora.clone()],
            steps: vec![
                WorkflowStep::Speak {
                    agent_id: alice.clone(),
                },
                WorkflowStep::ParallelSpeak {
                    agent_ids: vec![alice.clone(), bob.clone(), cora.clone()],
                },
                WorkflowStep::UserIntervention {
                    label: Some("Steer the discussion".to_string()),
                },
                WorkflowStep::Summary {
                    agent_id: cora.clone(),
                },
            ],
            is_active: true,
        })
        .await
        .unwrap();

    let meeting = store
        .create_meeting(&NewMeeting {
            title: "Planning".to_string(),
            topic: "What to build next".to_string(),
            whiteboard: String::new(),
            workflow_id: workflow.id.clone(),
            start_prompt_override: None,
            end_prompt_override: None,
            summary_agent_id: None,
        })
        .await
        .unwrap();

    // Bob's model fails; partial tolerance must carry the parallel round.
    let port = Arc::new(StubPort {
        calls: AtomicUsize::new(0),
        fail_model: Some("model-bob".to_string()),
    });
    let runner = MeetingRunner::new(Arc::clone(&store), port.clone());

    // Advancing before start is rejected.
    assert!(runner.run_next(&meeting.id).await.is_err());

    let started = runner.start(&meeting.id).await.unwrap();
    assert_eq!(started.status, MeetingStatus::InProgress);

    // Step 1: Alice speaks.
    let report = runner.run_next(&meeting.id).await.unwrap();
    assert_eq!(report.current_step, 1);
    assert_eq!(report.status, MeetingStatus::InProgress);
    assert_eq!(report.messages.len(), 1);
    assert_eq!(report.messages[0].content, "reply from model-alice");

    // Step 2: parallel round, Bob dropped, list order kept.
    let report = runner.run_next(&meeting.id).await.unwrap();
    assert_eq!(report.current_step, 2);
    let names: Vec<&str> = report
        .messages
        .iter()
        .map(|m| m.agent_name.as_str())
        .collect();
    assert_eq!(names, vec!["Alice", "Cora"]);

    // Step 3: intervention pauses the meeting.
    let report = runner.run_next(&meeting.id).await.unwrap();
    assert_eq!(report.status, MeetingStatus::Waiting);
    assert_eq!(report.messages[0].content, "Steer the discussion");
    let calls_before_pause = port.calls.load(Ordering::SeqCst);

    // A paused meeting cannot be advanced directly.
    assert!(runner.run_next(&meeting.id).await.is_err());
    assert_eq!(port.calls.load(Ordering::SeqCst), calls_before_pause);

    // Resume with a whiteboard edit; the summary closes the meeting.
    let report = runner
        .resume(&meeting.id, Some("Decision: build the importer.".to_string()))
        .await
        .unwrap();
    assert_eq!(report.status, MeetingStatus::Completed);
    assert_eq!(report.current_step, 4);
    assert_eq!(report.messages.len(), 1);
    assert_eq!(report.messages[0].content, "reply from model-cora");

    let finished = store.get_meeting(&meeting.id).await.unwrap().unwrap();
    assert_eq!(finished.status, MeetingStatus::Completed);
    assert_eq!(finished.whiteboard, "Decision: build the importer.");
    assert_eq!(
        finished.final_conclusion.as_deref(),
        Some("reply from model-cora")
    );
    assert!(finished.completed_at.is_some());

    // Terminal once: no further advance, no further model calls.
    let calls_at_end = port.calls.load(Ordering::SeqCst);
    assert!(runner.run_next(&meeting.id).await.is_err());
    assert_eq!(port.calls.load(Ordering::SeqCst), calls_at_end);

    // The transcript holds every persisted message with its step number.
    let messages = store.list_messages(&meeting.id).await.unwrap();
    let steps: Vec<Option<usize>> = messages.iter().map(|m| m.step_number).collect();
    assert_eq!(
        steps,
        vec![Some(0), Some(1), Some(2), Some(2), Some(3), Some(4)]
    );
}
