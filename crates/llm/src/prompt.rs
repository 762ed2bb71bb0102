use crate::provider::{GenerationRequest, Message, Role};

const PERSONA: &str =
    "You are an expert League of Legends analyst providing personalized player insights.";

const REQUIREMENTS: &str = "Requirements:
- Keep response under 2 sentences
- Be specific and actionable
- Use League of Legends terminology
- Focus on player improvement";

/// Single-string prompt for completion-style backends (the relay).
pub fn render_prompt(request: &GenerationRequest) -> String {
    format!(
        "{PERSONA}\n\nContext:\n{}\n\nTask:\n{}\n\n{REQUIREMENTS}\n\nProvide your insight:",
        request.context, request.query
    )
}

/// System plus user message for chat-style backends.
pub fn chat_messages(request: &GenerationRequest) -> Vec<Message> {
    vec![
        Message::new(Role::System, format!("{PERSONA}\n\n{REQUIREMENTS}")),
        Message::new(
            Role::User,
            format!(
                "Context:\n{}\n\nTask:\n{}",
                request.context, request.query
            ),
        ),
    ]
}
