use crate::chat::{
    HistoryMessage, TurnOrchestrator, TurnRequest, TurnResponse, parse_cancel_typing,
};
use crate::error::TurnError;
use crate::mood::{MoodState, ResponseGrouping};
use std::sync::Arc;

/// Terminal-side conversation: holds the caller state the engine hands back
/// and replays it on the next turn.
pub struct ChatSession {
    orchestrator: Arc<TurnOrchestrator>,
    grouping: Option<ResponseGrouping>,
    persona: Option<String>,
    state: Option<MoodState>,
    history: Vec<HistoryMessage>,
}

impl ChatSession {
    pub fn new(
        orchestrator: Arc<TurnOrchestrator>,
        grouping: Option<ResponseGrouping>,
        persona: Option<String>,
    ) -> Self {
        Self {
            orchestrator,
            grouping,
            persona,
            state: None,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> Option<&MoodState> {
        self.state.as_ref()
    }

    pub fn history(&self) -> &[HistoryMessage] {
        &self.history
    }

    /// Run one turn and fold its result into the session.
    pub async fn send(&mut self, message: &str) -> Result<TurnResponse, TurnError> {
        let request = TurnRequest {
            message: message.to_string(),
            conversation_history: self.history.clone(),
            mood_state: self.state.clone(),
            response_grouping_mode: self.grouping,
            custom_persona_behavior: self.persona.clone(),
        };
        let response = self.orchestrator.run_turn(request).await?;

        self.history.push(HistoryMessage::user(message));
        self.history.extend(
            response
                .messages
                .iter()
                .filter(|m| parse_cancel_typing(&m.text).is_none())
                .map(|m| HistoryMessage::ai(m.text.clone())),
        );
        self.state = Some(response.mood_state.clone());
        Ok(response)
    }
}
