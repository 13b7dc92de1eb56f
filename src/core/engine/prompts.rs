//! Prompt construction. Everything here is pure: given the same inputs the
//! same strings come out, which keeps the prompts testable as golden strings
//! and keeps the dispatch layer free of formatting.

use crate::core::meeting::{Agent, Message, OutputStyle};

/// Rendered in place of the history block so prompts never contain an
/// ambiguous blank section.
pub const EMPTY_HISTORY_SENTINEL: &str = "(no messages yet)";

/// One line of header per utterance, then its content. Old rows may lack a
/// role or step number; "unknown" and "?" stand in for them.
pub fn format_message_history(messages: &[Message]) -> String {
    if messages.is_empty() {
        return EMPTY_HISTORY_SENTINEL.to_string();
    }
    messages
        .iter()
        .map(|m| {
            let role = m.agent_role.as_deref().unwrap_or("unknown");
            let step = m
                .step_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string());
            format!("[{} | {} | step {}]\n{}", m.agent_name, role, step, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// System prompt for a speaking turn. Sections appear in a fixed order;
/// missing persona/prompt sections are omitted entirely.
pub fn build_speaker_system_prompt(
    agent: &Agent,
    style: &OutputStyle,
    start_prompt: &str,
) -> String {
    let mut prompt = format!(
        "You are a meeting participant named \"{}\".\n\n## Your role\n{}\n",
        agent.name, agent.role
    );
    if !agent.persona.trim().is_empty() {
        prompt.push_str("\n## Your persona\n");
        prompt.push_str(&agent.persona);
        prompt.push('\n');
    }
    if let Some(extra) = agent.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
        prompt.push_str("\n## Additional instructions\n");
        prompt.push_str(extra);
        prompt.push('\n');
    }
    if !start_prompt.trim().is_empty() {
        prompt.push_str("\n## Instructions from the meeting organizer\n");
        prompt.push_str(start_prompt);
        prompt.push('\n');
    }
    prompt.push_str("\n## Output format and style\n");
    prompt.push_str(&style.prompt_segment);
    prompt.push_str(
        "\n\n---\nFollow all of the instructions above when contributing to the discussion. \
         There is no upper limit on the length of your response.",
    );
    prompt
}

/// User message for a speaking turn: topic, full history, then an instruction
/// framed by the agent's role.
pub fn build_speaker_user_message(topic: &str, messages: &[Message], role: &str) -> String {
    format!(
        "## Meeting topic\n{}\n\n## Discussion so far\n{}\n\n---\nSpeaking as the {}, \
         consider the flow of the discussion and state the opinion or question you want \
         to raise next.",
        topic,
        format_message_history(messages),
        role
    )
}

/// System prompt for the summarizing turn: same shape as the speaker prompt,
/// but frames the agent as the meeting's summarizer and injects the effective
/// end instructions.
pub fn build_summary_system_prompt(
    agent: &Agent,
    style: &OutputStyle,
    end_prompt: &str,
) -> String {
    let mut prompt = format!(
        "You are \"{}\", acting as this meeting's summarizer.\n\n## Your role\n{}\n",
        agent.name, agent.role
    );
    if !agent.persona.trim().is_empty() {
        prompt.push_str("\n## Your persona\n");
        prompt.push_str(&agent.persona);
        prompt.push('\n');
    }
    if !end_prompt.trim().is_empty() {
        prompt.push_str("\n## Instructions for the final summary\n");
        prompt.push_str(end_prompt);
        prompt.push('\n');
    }
    prompt.push_str("\n## Output format and style\n");
    prompt.push_str(&style.prompt_segment);
    prompt.push_str(
        "\n\n---\nStay neutral, synthesize rather than repeat, and make the conclusion \
         concrete enough to act on. There is no upper limit on the length of your response.",
    );
    prompt
}

/// User message for the summarizing turn. No "next speaker" framing.
pub fn build_summary_user_message(topic: &str, messages: &[Message]) -> String {
    format!(
        "## Meeting topic\n{}\n\n## Full discussion history\n{}\n\n---\nBased on the \
         discussion above, produce the final conclusion summary for this meeting.",
        topic,
        format_message_history(messages)
    )
}
