//! SQLite persistence for meeting configuration and transcripts. The engine
//! never touches this directly; it sees only the style-resolver seam, and the
//! runner persists engine outcomes after each advance.

pub mod seed;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, params};
use tokio::sync::Mutex;
use tracing::info;

use crate::core::engine::StyleResolver;
use crate::core::meeting::{
    Agent, Meeting, MeetingStatus, MeetingWorkflow, Message, OutputStyle, WorkflowStep,
};

pub struct MeetingStore {
    db: Arc<Mutex<Connection>>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewAgent {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub persona: String,
    #[serde(default)]
    pub prompt: Option<String>,
    pub style_id: String,
    pub provider: String,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.7
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewOutputStyle {
    pub name: String,
    pub prompt_segment: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewWorkflow {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_prompt: String,
    #[serde(default)]
    pub end_prompt: String,
    #[serde(default)]
    pub agent_ids: Vec<String>,
    pub steps: Vec<WorkflowStep>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewMeeting {
    pub title: String,
    pub topic: String,
    #[serde(default)]
    pub whiteboard: String,
    pub workflow_id: String,
    #[serde(default)]
    pub start_prompt_override: Option<String>,
    #[serde(default)]
    pub end_prompt_override: Option<String>,
    #[serde(default)]
    pub summary_agent_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub meeting_id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub agent_role: Option<String>,
    pub step_number: Option<usize>,
    pub agent_avatar_url: Option<String>,
    pub content: String,
}

impl MeetingStore {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let db = Connection::open(path.as_ref())?;
        let store = Self {
            db: Arc::new(Mutex::new(db)),
        };
        store.init_schema().await?;
        info!("Meeting store ready at {}", path.as_ref().display());
        Ok(store)
    }

    pub async fn open_in_memory() -> Result<Self> {
        let store = Self {
            db: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        let db = self.db.lock().await;
        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS agents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                avatar_url TEXT,
                persona TEXT NOT NULL DEFAULT '',
                prompt TEXT,
                style_id TEXT NOT NULL,
                provider TEXT NOT NULL,
                model TEXT NOT NULL,
                temperature REAL NOT NULL DEFAULT 0.7,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS output_styles (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                prompt_segment TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                start_prompt TEXT NOT NULL DEFAULT '',
                end_prompt TEXT NOT NULL DEFAULT '',
                agent_ids TEXT NOT NULL DEFAULT '[]',
                steps TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS meetings (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                topic TEXT NOT NULL,
                whiteboard TEXT NOT NULL DEFAULT '',
                workflow_id TEXT NOT NULL,
                current_step INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'pending',
                start_prompt_override TEXT,
                end_prompt_override TEXT,
                summary_agent_id TEXT,
                final_conclusion TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                completed_at DATETIME
            );
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                meeting_id TEXT NOT NULL,
                agent_id TEXT NOT NULL,
                agent_name TEXT NOT NULL,
                agent_role TEXT,
                step_number INTEGER,
                agent_avatar_url TEXT,
                content TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_messages_meeting ON messages(meeting_id, id);",
        )?;
        Ok(())
    }

    // --- Agents ---

    pub async fn create_agent(&self, input: &NewAgent) -> Result<Agent> {
        let id = uuid::Uuid::new_v4().to_string();
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO agents (id, name, role, avatar_url, persona, prompt, style_id, provider, model, temperature)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                input.name,
                input.role,
                input.avatar_url,
                input.persona,
                input.prompt,
                input.style_id,
                input.provider,
                input.model,
                input.temperature,
            ],
        )?;
        Ok(Agent {
            id,
            name: input.name.clone(),
            role: input.role.clone(),
            avatar_url: input.avatar_url.clone(),
            persona: input.persona.clone(),
            prompt: input.prompt.clone(),
            style_id: input.style_id.clone(),
            provider: input.provider.clone(),
            model: input.model.clone(),
            temperature: input.temperature,
        })
    }

    pub async fn list_agents(&self) -> Result<Vec<Agent>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, name, role, avatar_url, persona, prompt, style_id, provider, model, temperature
             FROM agents ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([], agent_from_row)?;
        let mut agents = Vec::new();
        for row in rows {
            agents.push(row?);
        }
        Ok(agents)
    }

    pub async fn get_agent(&self, id: &str) -> Result<Option<Agent>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, name, role, avatar_url, persona, prompt, style_id, provider, model, temperature
             FROM agents WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], agent_from_row)?;
        Ok(rows.next().transpose()?)
    }

    pub async fn update_agent(&self, id: &str, input: &NewAgent) -> Result<bool> {
        let db = self.db.lock().await;
        let changed = db.execute(
            "UPDATE agents SET name = ?2, role = ?3, avatar_url = ?4, persona = ?5, prompt = ?6,
                    style_id = ?7, provider = ?8, model = ?9, temperature = ?10,
                    updated_at = CURRENT_TIMESTAMP
             WHERE id = ?1",
            params![
                id,
                input.name,
                input.role,
                input.avatar_url,
                input.persona,
                input.prompt,
                input.style_id,
                input.provider,
                input.model,
                input.temperature,
            ],
        )?;
        Ok(changed > 0)
    }

    pub async fn delete_agent(&self, id: &str) -> Result<bool> {
        let db = self.db.lock().await;
        Ok(db.execute("DELETE FROM agents WHERE id = ?1", params![id])? > 0)
    }

    // --- Output styles ---

    pub async fn create_output_style(&self, input: &NewOutputStyle) -> Result<OutputStyle> {
        let id = uuid::Uuid::new_v4().to_string();
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO output_styles (id, name, prompt_segment, description, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                input.name,
                input.prompt_segment,
                input.description,
                input.is_active,
            ],
        )?;
        Ok(OutputStyle {
            id,
            name: input.name.clone(),
            prompt_segment: input.prompt_segment.clone(),
            description: input.description.clone(),
            is_active: input.is_active,
        })
    }

    pub async fn list_output_styles(&self) -> Result<Vec<OutputStyle>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, name, prompt_segment, description, is_active
             FROM output_styles ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([], style_from_row)?;
        let mut styles = Vec::new();
        for row in rows {
            styles.push(row?);
        }
        Ok(styles)
    }

    pub async fn get_output_style(&self, id: &str) -> Result<Option<OutputStyle>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, name, prompt_segment, description, is_active
             FROM output_styles WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], style_from_row)?;
        Ok(rows.next().transpose()?)
    }

    pub async fn update_output_style(&self, id: &str, input: &NewOutputStyle) -> Result<bool> {
        let db = self.db.lock().await;
        let changed = db.execute(
            "UPDATE output_styles SET name = ?2, prompt_segment = ?3, description = ?4, is_active = ?5
             WHERE id = ?1",
            params![
                id,
                input.name,
                input.prompt_segment,
                input.description,
                input.is_active,
            ],
        )?;
        Ok(changed > 0)
    }

    pub async fn delete_output_style(&self, id: &str) -> Result<bool> {
        let db = self.db.lock().await;
        Ok(db.execute("DELETE FROM output_styles WHERE id = ?1", params![id])? > 0)
    }

    // --- Workflows ---

    pub async fn create_workflow(&self, input: &NewWorkflow) -> Result<MeetingWorkflow> {
        let id = uuid::Uuid::new_v4().to_string();
        let agent_ids = serde_json::to_string(&input.agent_ids)?;
        let steps = serde_json::to_string(&input.steps)?;
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO workflows (id, name, description, start_prompt, end_prompt, agent_ids, steps, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                input.name,
                input.description,
                input.start_prompt,
                input.end_prompt,
                agent_ids,
                steps,
                input.is_active,
            ],
        )?;
        Ok(MeetingWorkflow {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            start_prompt: input.start_prompt.clone(),
            end_prompt: input.end_prompt.clone(),
            agent_ids: input.agent_ids.clone(),
            steps: input.steps.clone(),
            is_active: input.is_active,
        })
    }

    pub async fn list_workflows(&self) -> Result<Vec<MeetingWorkflow>> {
        let raw = {
            let db = self.db.lock().await;
            let mut stmt = db.prepare(
                "SELECT id, name, description, start_prompt, end_prompt, agent_ids, steps, is_active
                 FROM workflows ORDER BY created_at DESC",
            )?;
            let rows = stmt.query_map([], workflow_raw_from_row)?;
            let mut raw = Vec::new();
            for row in rows {
                raw.push(row?);
            }
            raw
        };
        raw.into_iter().map(workflow_from_raw).collect()
    }

    pub async fn get_workflow(&self, id: &str) -> Result<Option<MeetingWorkflow>> {
        let raw = {
            let db = self.db.lock().await;
            let mut stmt = db.prepare(
                "SELECT id, name, description, start_prompt, end_prompt, agent_ids, steps, is_active
                 FROM workflows WHERE id = ?1",
            )?;
            let mut rows = stmt.query_map(params![id], workflow_raw_from_row)?;
            rows.next().transpose()?
        };
        raw.map(workflow_from_raw).transpose()
    }

    pub async fn update_workflow(&self, id: &str, input: &NewWorkflow) -> Result<bool> {
        let agent_ids = serde_json::to_string(&input.agent_ids)?;
        let steps = serde_json::to_string(&input.steps)?;
        let db = self.db.lock().await;
        let changed = db.execute(
            "UPDATE workflows SET name = ?2, description = ?3, start_prompt = ?4, end_prompt = ?5,
                    agent_ids = ?6, steps = ?7, is_active = ?8
             WHERE id = ?1",
            params![
                id,
                input.name,
                input.description,
                input.start_prompt,
                input.end_prompt,
                agent_ids,
                steps,
                input.is_active,
            ],
        )?;
        Ok(changed > 0)
    }

    pub async fn delete_workflow(&self, id: &str) -> Result<bool> {
        let db = self.db.lock().await;
        Ok(db.execute("DELETE FROM workflows WHERE id = ?1", params![id])? > 0)
    }

    // --- Meetings ---

    pub async fn create_meeting(&self, input: &NewMeeting) -> Result<Meeting> {
        let id = uuid::Uuid::new_v4().to_string();
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO meetings (id, title, topic, whiteboard, workflow_id,
                    start_prompt_override, end_prompt_override, summary_agent_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                input.title,
                input.topic,
                input.whiteboard,
                input.workflow_id,
                input.start_prompt_override,
                input.end_prompt_override,
                input.summary_agent_id,
            ],
        )?;
        drop(db);
        self.get_meeting(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("meeting row vanished after insert"))
    }

    pub async fn list_meetings(&self) -> Result<Vec<Meeting>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([], meeting_from_row)?;
        let mut meetings = Vec::new();
        for row in rows {
            meetings.push(row?);
        }
        Ok(meetings)
    }

    pub async fn get_meeting(&self, id: &str) -> Result<Option<Meeting>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id], meeting_from_row)?;
        Ok(rows.next().transpose()?)
    }

    pub async fn set_meeting_status(&self, id: &str, status: MeetingStatus) -> Result<bool> {
        let db = self.db.lock().await;
        let changed = db.execute(
            "UPDATE meetings SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        Ok(changed > 0)
    }

    pub async fn update_meeting_whiteboard(&self, id: &str, whiteboard: &str) -> Result<bool> {
        let db = self.db.lock().await;
        let changed = db.execute(
            "UPDATE meetings SET whiteboard = ?2 WHERE id = ?1",
            params![id, whiteboard],
        )?;
        Ok(changed > 0)
    }

    /// Persist the outcome of one successful advance: the new cursor, the new
    /// status, and — when the meeting completed — the final conclusion and
    /// completion timestamp.
    pub async fn apply_advance(
        &self,
        id: &str,
        current_step: usize,
        status: MeetingStatus,
        final_conclusion: Option<&str>,
    ) -> Result<bool> {
        let db = self.db.lock().await;
        let changed = match final_conclusion {
            Some(conclusion) => db.execute(
                "UPDATE meetings SET current_step = ?2, status = ?3, final_conclusion = ?4,
                        completed_at = CURRENT_TIMESTAMP
                 WHERE id = ?1",
                params![id, current_step as i64, status.as_str(), conclusion],
            )?,
            None => db.execute(
                "UPDATE meetings SET current_step = ?2, status = ?3 WHERE id = ?1",
                params![id, current_step as i64, status.as_str()],
            )?,
        };
        Ok(changed > 0)
    }

    // --- Messages ---

    pub async fn append_message(&self, input: &NewMessage) -> Result<i64> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO messages (meeting_id, agent_id, agent_name, agent_role, step_number, agent_avatar_url, content)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                input.meeting_id,
                input.agent_id,
                input.agent_name,
                input.agent_role,
                input.step_number.map(|n| n as i64),
                input.agent_avatar_url,
                input.content,
            ],
        )?;
        Ok(db.last_insert_rowid())
    }

    pub async fn list_messages(&self, meeting_id: &str) -> Result<Vec<Message>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, meeting_id, agent_id, agent_name, agent_role, step_number, agent_avatar_url, content, created_at
             FROM messages WHERE meeting_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![meeting_id], message_from_row)?;
        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }
}

const MEETING_COLUMNS: &str = "id, title, topic, whiteboard, workflow_id, current_step, status, \
     start_prompt_override, end_prompt_override, summary_agent_id, final_conclusion, \
     created_at, completed_at";

fn agent_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Agent> {
    Ok(Agent {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        avatar_url: row.get(3)?,
        persona: row.get(4)?,
        prompt: row.get(5)?,
        style_id: row.get(6)?,
        provider: row.get(7)?,
        model: row.get(8)?,
        temperature: row.get(9)?,
    })
}

fn style_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OutputStyle> {
    Ok(OutputStyle {
        id: row.get(0)?,
        name: row.get(1)?,
        prompt_segment: row.get(2)?,
        description: row.get(3)?,
        is_active: row.get(4)?,
    })
}

type WorkflowRaw = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    bool,
);

fn workflow_raw_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkflowRaw> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn workflow_from_raw(raw: WorkflowRaw) -> Result<MeetingWorkflow> {
    let (id, name, description, start_prompt, end_prompt, agent_ids, steps, is_active) = raw;
    Ok(MeetingWorkflow {
        id,
        name,
        description,
        start_prompt,
        end_prompt,
        agent_ids: serde_json::from_str(&agent_ids)?,
        steps: serde_json::from_str(&steps)?,
        is_active,
    })
}

fn meeting_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Meeting> {
    let status_raw: String = row.get(6)?;
    let current_step: i64 = row.get(5)?;
    Ok(Meeting {
        id: row.get(0)?,
        title: row.get(1)?,
        topic: row.get(2)?,
        whiteboard: row.get(3)?,
        workflow_id: row.get(4)?,
        current_step: current_step.max(0) as usize,
        // An unrecognized status column value reads as the error state rather
        // than aborting the whole query.
        status: MeetingStatus::from_status(&status_raw).unwrap_or(MeetingStatus::Error),
        start_prompt_override: row.get(7)?,
        end_prompt_override: row.get(8)?,
        summary_agent_id: row.get(9)?,
        final_conclusion: row.get(10)?,
        created_at: row.get(11)?,
        completed_at: row.get(12)?,
    })
}

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let step_number: Option<i64> = row.get(5)?;
    Ok(Message {
        id: row.get(0)?,
        meeting_id: row.get(1)?,
        agent_id: row.get(2)?,
        agent_name: row.get(3)?,
        agent_role: row.get(4)?,
        step_number: step_number.map(|n| n.max(0) as usize),
        agent_avatar_url: row.get(6)?,
        content: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[async_trait]
impl StyleResolver for MeetingStore {
    async fn resolve_output_style(&self, style_id: &str) -> Result<Option<OutputStyle>> {
        self.get_output_style(style_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_agent(style_id: &str) -> NewAgent {
        NewAgent {
            name: "Strategist".to_string(),
            role: "strategy lead".to_string(),
            avatar_url: None,
            persona: "Pragmatic, focused on tradeoffs.".to_string(),
            prompt: None,
            style_id: style_id.to_string(),
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.6,
        }
    }

    #[tokio::test]
    async fn agent_round_trip_and_delete() {
        let store = MeetingStore::open_in_memory().await.unwrap();
        let created = store.create_agent(&sample_agent("style-1")).await.unwrap();

        let fetched = store.get_agent(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Strategist");
        assert_eq!(fetched.temperature, 0.6);

        let mut update = sample_agent("style-2");
        update.name = "Planner".to_string();
        assert!(store.update_agent(&created.id, &update).await.unwrap());
        let fetched = store.get_agent(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Planner");
        assert_eq!(fetched.style_id, "style-2");

        assert!(store.delete_agent(&created.id).await.unwrap());
        assert!(store.get_agent(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn workflow_steps_survive_json_round_trip() {
        let store = MeetingStore::open_in_memory().await.unwrap();
        let workflow = store
            .create_workflow(&NewWorkflow {
                name: "Brainstorm".to_string(),
                description: String::new(),
                start_prompt: "Keep it on topic.".to_string(),
                end_prompt: "Summarize decisions.".to_string(),
                agent_ids: vec!["a1".to_string(), "a2".to_string()],
                steps: vec![
                    WorkflowStep::Speak {
                        agent_id: "a1".to_string(),
                    },
                    WorkflowStep::ParallelSpeak {
                        agent_ids: vec!["a1".to_string(), "a2".to_string()],
                    },
                    WorkflowStep::UserIntervention { label: None },
                    WorkflowStep::Summary {
                        agent_id: "a2".to_string(),
                    },
                ],
                is_active: true,
            })
            .await
            .unwrap();

        let fetched = store.get_workflow(&workflow.id).await.unwrap().unwrap();
        assert_eq!(fetched.steps.len(), 4);
        assert_eq!(
            fetched.steps[3],
            WorkflowStep::Summary {
                agent_id: "a2".to_string()
            }
        );
        assert_eq!(fetched.agent_ids, vec!["a1", "a2"]);
    }

    #[tokio::test]
    async fn meeting_advance_persists_cursor_status_and_conclusion() {
        let store = MeetingStore::open_in_memory().await.unwrap();
        let meeting = store
            .create_meeting(&NewMeeting {
                title: "Kickoff".to_string(),
                topic: "Q3 roadmap".to_string(),
                whiteboard: String::new(),
                workflow_id: "wf-1".to_string(),
                start_prompt_override: None,
                end_prompt_override: None,
                summary_agent_id: None,
            })
            .await
            .unwrap();
        assert_eq!(meeting.status, MeetingStatus::Pending);
        assert_eq!(meeting.current_step, 0);
        assert!(meeting.completed_at.is_none());

        store
            .apply_advance(&meeting.id, 1, MeetingStatus::InProgress, None)
            .await
            .unwrap();
        let fetched = store.get_meeting(&meeting.id).await.unwrap().unwrap();
        assert_eq!(fetched.current_step, 1);
        assert_eq!(fetched.status, MeetingStatus::InProgress);
        assert!(fetched.final_conclusion.is_none());

        store
            .apply_advance(&meeting.id, 2, MeetingStatus::Completed, Some("Ship it."))
            .await
            .unwrap();
        let fetched = store.get_meeting(&meeting.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, MeetingStatus::Completed);
        assert_eq!(fetched.final_conclusion.as_deref(), Some("Ship it."));
        assert!(fetched.completed_at.is_some());
    }

    #[tokio::test]
    async fn messages_keep_insertion_order() {
        let store = MeetingStore::open_in_memory().await.unwrap();
        for (agent, content) in [("a1", "first"), ("a2", "second"), ("a1", "third")] {
            store
                .append_message(&NewMessage {
                    meeting_id: "m-1".to_string(),
                    agent_id: agent.to_string(),
                    agent_name: agent.to_uppercase(),
                    agent_role: Some("participant".to_string()),
                    step_number: Some(1),
                    agent_avatar_url: None,
                    content: content.to_string(),
                })
                .await
                .unwrap();
        }
        let messages = store.list_messages("m-1").await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert!(store.list_messages("m-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn style_resolver_returns_stored_style() {
        let store = MeetingStore::open_in_memory().await.unwrap();
        let style = store
            .create_output_style(&NewOutputStyle {
                name: "Concise".to_string(),
                prompt_segment: "Answer in three bullet points.".to_string(),
                description: String::new(),
                is_active: true,
            })
            .await
            .unwrap();

        let resolved = store
            .resolve_output_style(&style.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.prompt_segment, "Answer in three bullet points.");
        assert!(
            store
                .resolve_output_style("missing")
                .await
                .unwrap()
                .is_none()
        );
    }
}
