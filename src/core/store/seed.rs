//! Example styles, agents, and workflows loaded by `quorum seed`. Seeding is
//! skipped when the store already holds any workflow, so it is safe to run
//! repeatedly.

use anyhow::Result;
use tracing::info;

use super::{MeetingStore, NewAgent, NewOutputStyle, NewWorkflow};
use crate::core::meeting::WorkflowStep;

fn concise_style() -> NewOutputStyle {
    NewOutputStyle {
        name: "Concise bullets".to_string(),
        prompt_segment: "Respond with at most five bullet points. Lead with your single \
                         strongest point. No preamble."
            .to_string(),
        description: "Short, scannable contributions for fast rounds.".to_string(),
        is_active: true,
    }
}

fn memo_style() -> NewOutputStyle {
    NewOutputStyle {
        name: "Structured memo".to_string(),
        prompt_segment: "Respond as a short memo: a one-sentence position, a numbered list \
                         of supporting arguments, and a closing recommendation."
            .to_string(),
        description: "Longer-form contributions for summary and deep-dive turns.".to_string(),
        is_active: true,
    }
}

fn seed_agent(name: &str, role: &str, persona: &str, style_id: &str, model: &str) -> NewAgent {
    NewAgent {
        name: name.to_string(),
        role: role.to_string(),
        avatar_url: None,
        persona: persona.to_string(),
        prompt: None,
        style_id: style_id.to_string(),
        provider: "openai".to_string(),
        model: model.to_string(),
        temperature: 0.7,
    }
}

pub async fn seed_examples(store: &MeetingStore) -> Result<bool> {
    if !store.list_workflows().await?.is_empty() {
        info!("Store already seeded, skipping");
        return Ok(false);
    }

    let concise = store.create_output_style(&concise_style()).await?;
    let memo = store.create_output_style(&memo_style()).await?;
    info!("Seeded output styles: {}, {}", concise.name, memo.name);

    let strategist = store
        .create_agent(&seed_agent(
            "Iris",
            "strategy lead",
            "Pragmatic and outcome-driven. Weighs cost against impact and pushes the group \
             toward a decision it can commit to.",
            &concise.id,
            "gpt-4o",
        ))
        .await?;
    let critic = store
        .create_agent(&seed_agent(
            "Marlow",
            "devil's advocate",
            "Relentlessly skeptical. Hunts for hidden risks, unstated assumptions, and \
             optimistic hand-waving, and names them plainly.",
            &concise.id,
            "gpt-4o-mini",
        ))
        .await?;
    let synthesizer = store
        .create_agent(&seed_agent(
            "Quill",
            "synthesizer",
            "Neutral and thorough. Gives every viewpoint fair weight and turns a messy \
             discussion into a clear, actionable record.",
            &memo.id,
            "gpt-4o",
        ))
        .await?;
    info!(
        "Seeded agents: {}, {}, {}",
        strategist.name, critic.name, synthesizer.name
    );

    let simple = store
        .create_workflow(&NewWorkflow {
            name: "Simple brainstorm".to_string(),
            description: "Two agents speak in turn, then the synthesizer concludes."
                .to_string(),
            start_prompt: "Respect the other participants' views, but keep the discussion \
                           anchored to the topic. Challenge the core of each prior point \
                           rather than its phrasing."
                .to_string(),
            end_prompt: "Conclude with: 1. a summary of what was decided, 2. each \
                         participant's key viewpoint, 3. concrete next actions. Be brief \
                         and unambiguous."
                .to_string(),
            agent_ids: vec![strategist.id.clone(), critic.id.clone(), synthesizer.id.clone()],
            steps: vec![
                WorkflowStep::Speak {
                    agent_id: strategist.id.clone(),
                },
                WorkflowStep::Speak {
                    agent_id: critic.id.clone(),
                },
                WorkflowStep::Summary {
                    agent_id: synthesizer.id.clone(),
                },
            ],
            is_active: true,
        })
        .await?;

    let deep_dive = store
        .create_workflow(&NewWorkflow {
            name: "Deep-dive with checkpoint".to_string(),
            description: "Everyone speaks at once, the user steers via the whiteboard, \
                          then a final round and conclusion."
                .to_string(),
            start_prompt: "The purpose of this meeting is scrutiny. Do not let optimistic \
                           projections or hidden risks pass unchallenged; point out logical \
                           gaps directly so the proposal gets stronger."
                .to_string(),
            end_prompt: "List the critical risks and the open problems surfaced by the \
                         discussion, then give a cold overall verdict on whether the \
                         current proposal passes."
                .to_string(),
            agent_ids: vec![strategist.id.clone(), critic.id.clone(), synthesizer.id.clone()],
            steps: vec![
                WorkflowStep::ParallelSpeak {
                    agent_ids: vec![
                        strategist.id.clone(),
                        critic.id.clone(),
                        synthesizer.id.clone(),
                    ],
                },
                WorkflowStep::UserIntervention {
                    label: Some(
                        "Review the first round and adjust the whiteboard with the \
                         direction you want the discussion to take."
                            .to_string(),
                    ),
                },
                WorkflowStep::Speak {
                    agent_id: strategist.id.clone(),
                },
                WorkflowStep::Summary {
                    agent_id: synthesizer.id.clone(),
                },
            ],
            is_active: true,
        })
        .await?;

    info!("Seeded workflows: {}, {}", simple.name, deep_dive.name);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = MeetingStore::open_in_memory().await.unwrap();
        assert!(seed_examples(&store).await.unwrap());
        assert!(!seed_examples(&store).await.unwrap());

        let workflows = store.list_workflows().await.unwrap();
        assert_eq!(workflows.len(), 2);
        assert_eq!(store.list_agents().await.unwrap().len(), 3);
        assert_eq!(store.list_output_styles().await.unwrap().len(), 2);

        // Every agent a workflow references must exist.
        for workflow in workflows {
            for step in &workflow.steps {
                for agent_id in step.referenced_agent_ids() {
                    assert!(store.get_agent(agent_id).await.unwrap().is_some());
                }
            }
        }
    }
}
