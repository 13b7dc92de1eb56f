//! Domain types for meetings: the configured entities (agent, output style,
//! workflow), the transcript [`Message`], the declarative [`WorkflowStep`]
//! union, and the [`Meeting`] record with its status state machine.
//!
//! These types are persistence- and transport-agnostic: the store maps them to
//! and from SQLite rows, the web layer serializes them to JSON, and the engine
//! reads them from an execution-context snapshot. Serde representations follow
//! the teacher's conventions — `snake_case` enums and a `type`-tagged step
//! union.

use serde::{Deserialize, Serialize};

/// A configured meeting participant. `style_id` is resolved at call time, never
/// cached in the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub persona: String,
    pub prompt: Option<String>,
    pub style_id: String,
    pub provider: String,
    pub model: String,
    pub temperature: f32,
}

/// A reusable output-formatting fragment, resolved by id and spliced into a
/// speaker or summary prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputStyle {
    pub id: String,
    pub name: String,
    pub prompt_segment: String,
    pub description: String,
    pub is_active: bool,
}

/// One step of a meeting workflow. A closed, `type`-tagged union so unknown
/// step kinds are unrepresentable and dispatch can be exhaustive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowStep {
    Speak { agent_id: String },
    ParallelSpeak { agent_ids: Vec<String> },
    Summary { agent_id: String },
    UserIntervention { label: Option<String> },
}

impl WorkflowStep {
    /// The agent ids this step names directly, in declaration order. Used by
    /// the runner to assemble the participant set for context loading.
    pub fn referenced_agent_ids(&self) -> Vec<&str> {
        match self {
            WorkflowStep::Speak { agent_id } | WorkflowStep::Summary { agent_id } => {
                vec![agent_id.as_str()]
            }
            WorkflowStep::ParallelSpeak { agent_ids } => {
                agent_ids.iter().map(String::as_str).collect()
            }
            WorkflowStep::UserIntervention { .. } => Vec::new(),
        }
    }
}

/// A declarative meeting workflow: the participant list for context assembly
/// plus the ordered steps that drive the meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingWorkflow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_prompt: String,
    pub end_prompt: String,
    pub agent_ids: Vec<String>,
    pub steps: Vec<WorkflowStep>,
    pub is_active: bool,
}

/// The lifecycle state of a meeting. `pending → in_progress → {waiting ⇄
/// in_progress} → {completed | error}`; `completed` and `error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Pending,
    InProgress,
    Waiting,
    Completed,
    Error,
}

impl MeetingStatus {
    /// The stored/wire string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Pending => "pending",
            MeetingStatus::InProgress => "in_progress",
            MeetingStatus::Waiting => "waiting",
            MeetingStatus::Completed => "completed",
            MeetingStatus::Error => "error",
        }
    }

    /// Parse a stored/wire string back into a status; `None` for anything
    /// unrecognized so callers can decide how to treat a bad value.
    pub fn from_status(value: &str) -> Option<MeetingStatus> {
        match value {
            "pending" => Some(MeetingStatus::Pending),
            "in_progress" => Some(MeetingStatus::InProgress),
            "waiting" => Some(MeetingStatus::Waiting),
            "completed" => Some(MeetingStatus::Completed),
            "error" => Some(MeetingStatus::Error),
            _ => None,
        }
    }

    /// `completed` and `error` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MeetingStatus::Completed | MeetingStatus::Error)
    }
}

/// Whether a meeting may move from `from` to `to`. Staying in place is always
/// allowed; any active state may be marked `error`; otherwise only the
/// lifecycle edges are permitted.
pub fn can_transition(from: MeetingStatus, to: MeetingStatus) -> bool {
    use MeetingStatus::*;
    if from == to {
        return true;
    }
    if from.is_terminal() {
        return false;
    }
    if to == Error {
        return true;
    }
    matches!(
        (from, to),
        (Pending, InProgress) | (InProgress, Waiting) | (InProgress, Completed) | (Waiting, InProgress)
    )
}

/// A meeting record. `current_step` starts at 0 and only advances on handler
/// success; `status` follows the state machine above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub topic: String,
    pub whiteboard: String,
    pub workflow_id: String,
    pub current_step: usize,
    pub status: MeetingStatus,
    pub start_prompt_override: Option<String>,
    pub end_prompt_override: Option<String>,
    pub summary_agent_id: Option<String>,
    pub final_conclusion: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

/// One persisted transcript entry. Append-only. `agent_role` and `step_number`
/// are optional for backward compatibility with older rows; the history
/// formatter supplies fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub meeting_id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub agent_role: Option<String>,
    pub step_number: Option<usize>,
    pub agent_avatar_url: Option<String>,
    pub content: String,
    pub created_at: String,
}
