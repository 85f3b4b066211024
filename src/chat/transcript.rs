use crate::mood::Sender;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Closing cue appended after the user's message.
pub const RESPONSE_CUE: &str = "You (respond with multiple separate messages):";

/// One entry of the caller-supplied conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMessage {
    pub text: String,
    pub sender: Sender,
}

impl HistoryMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Ai,
        }
    }

    fn speaker(&self) -> &'static str {
        match self.sender {
            Sender::User => "Human",
            Sender::Ai => "You",
        }
    }
}

/// Flatten system prompt, history and the new message into one generation input.
pub fn render_generation_input(
    system_prompt: &str,
    history: &[HistoryMessage],
    message: &str,
) -> String {
    let mut input = String::with_capacity(system_prompt.len() + message.len() + 64);
    input.push_str(system_prompt);
    input.push_str("\n\nConversation:\n");
    for entry in history {
        let _ = writeln!(input, "{}: {}", entry.speaker(), entry.text);
    }
    let _ = write!(input, "Human: {message}\n{RESPONSE_CUE}");
    input
}
