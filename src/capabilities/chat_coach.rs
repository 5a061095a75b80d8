use anyhow::Result;
use serde_json::json;

use super::{Capability, CapabilityId, OutputSchema};
use crate::models::{ChatInput, ChatOutput, Prompt};
use crate::render::HeadingRule;
use crate::services::validation::{Field, FieldRule, InputSchema};

pub fn capability() -> Result<Capability<ChatInput, ChatOutput>> {
    Ok(Capability {
        id: CapabilityId::ChatCoach,
        input_schema: InputSchema::new(vec![
            Field::required("message", FieldRule::Text { min_len: 1, max_len: 2000 }),
            Field::optional("chatHistory", FieldRule::ChatHistory),
        ]),
        output_schema: OutputSchema::new(json!({
            "type": "object",
            "properties": {
                "response": {
                    "type": "string",
                    "description": "The AI coach response to the user message."
                }
            },
            "required": ["response"]
        })),
        prompt_template: prompt,
        heading_rules: vec![
            HeadingRule::pattern(r"(Step|Day|Week)\s+\d+\s*:")?,
            HeadingRule::literal("Key Points:"),
            HeadingRule::literal("Summary:"),
        ],
        sub_heading_rules: vec![HeadingRule::literal("Tips"), HeadingRule::literal("Example")],
        output_check: None,
    })
}

fn prompt(input: &ChatInput) -> Prompt {
    let history = input
        .chat_history
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|turn| format!("{}: {}\n", turn.role, turn.content))
        .collect::<String>();

    Prompt::text(format!(
        "You are a 24/7 AI fitness coach providing guidance and support to users.\n\
         Respond to the user's message based on the chat history, providing helpful and motivational advice.\n\
         The chat history is a list of turns, where each turn is formatted as 'user: [message]' or 'assistant: [message]'.\n\
         \n\
         Chat History:\n\
         {}\n\
         User Message: {}\n\
         AI Coach: ",
        history, input.message
    ))
}
