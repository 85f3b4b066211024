use super::table::Mood;
use crate::error::TurnError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of entries kept in `MoodState::recent_messages`.
pub const RECENT_MESSAGE_WINDOW: usize = 10;

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentMessage {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub sender: Sender,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    #[serde(default)]
    pub user_apologized: bool,
    #[serde(default)]
    pub ai_apologized: bool,
    #[serde(alias = "lastUserMessageTime")]
    pub last_user_message_timestamp: DateTime<Utc>,
}

/// Caller-held mood state, round-tripped through the client every turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodState {
    pub current_mood: Mood,
    pub mood_intensity: u8,
    #[serde(alias = "lastMoodChange")]
    pub last_mood_change_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub recent_messages: VecDeque<RecentMessage>,
    pub conversation_context: ConversationContext,
}

impl MoodState {
    /// Fresh state used when the caller supplies none.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        let mood = Mood::default();
        Self {
            current_mood: mood,
            mood_intensity: mood.canonical_intensity(),
            last_mood_change_timestamp: now,
            recent_messages: VecDeque::with_capacity(RECENT_MESSAGE_WINDOW),
            conversation_context: ConversationContext {
                user_apologized: false,
                ai_apologized: false,
                last_user_message_timestamp: now,
            },
        }
    }

    /// Reject state that could only come from corruption or tampering.
    pub fn validate(&self) -> Result<(), TurnError> {
        if !(1..=10).contains(&self.mood_intensity) {
            return Err(TurnError::InvalidState(format!(
                "moodIntensity {} outside 1-10",
                self.mood_intensity
            )));
        }
        if self.recent_messages.len() > RECENT_MESSAGE_WINDOW {
            return Err(TurnError::InvalidState(format!(
                "recentMessages holds {} entries (max {RECENT_MESSAGE_WINDOW})",
                self.recent_messages.len()
            )));
        }
        Ok(())
    }

    /// Append to the sliding window, evicting the oldest entries past the cap.
    pub fn push_recent(&mut self, message: RecentMessage) {
        while self.recent_messages.len() >= RECENT_MESSAGE_WINDOW {
            self.recent_messages.pop_front();
        }
        self.recent_messages.push_back(message);
    }

    /// Up to `limit` most recent user messages, oldest first.
    pub fn recent_user_messages(&self, limit: usize) -> Vec<&RecentMessage> {
        let mut user_messages: Vec<&RecentMessage> = self
            .recent_messages
            .iter()
            .rev()
            .filter(|m| m.sender == Sender::User)
            .take(limit)
            .collect();
        user_messages.reverse();
        user_messages
    }

    /// Record an inbound user message and commit the mood chosen for this turn.
    ///
    /// `last_mood_change_timestamp` only moves when the label changes.
    pub fn record_user_message(
        &mut self,
        text: &str,
        mood: Mood,
        intensity: u8,
        now: DateTime<Utc>,
    ) {
        if mood != self.current_mood {
            self.last_mood_change_timestamp = now;
        }
        self.current_mood = mood;
        self.mood_intensity = intensity;

        self.push_recent(RecentMessage {
            text: text.to_string(),
            timestamp: now,
            sender: Sender::User,
        });

        let lower = text.to_lowercase();
        self.conversation_context.last_user_message_timestamp = now;
        self.conversation_context.user_apologized =
            lower.contains("sorry") || lower.contains("apologize");
        self.conversation_context.ai_apologized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn message(text: &str, sender: Sender, secs: i64) -> RecentMessage {
        RecentMessage {
            text: text.into(),
            timestamp: at(secs),
            sender,
        }
    }

    #[test]
    fn fresh_state_is_friendly_at_canonical_intensity() {
        let state = MoodState::fresh(at(0));
        assert_eq!(state.current_mood, Mood::Friendly);
        assert_eq!(state.mood_intensity, 5);
        assert!(state.recent_messages.is_empty());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn full_window_evicts_exactly_the_oldest() {
        let mut state = MoodState::fresh(at(0));
        for i in 0..10 {
            state.push_recent(message(&format!("m{i}"), Sender::User, i));
        }
        assert_eq!(state.recent_messages.len(), 10);

        state.push_recent(message("m10", Sender::User, 10));
        assert_eq!(state.recent_messages.len(), 10);
        assert_eq!(state.recent_messages.front().unwrap().text, "m1");
        assert_eq!(state.recent_messages.back().unwrap().text, "m10");
    }

    #[test]
    fn recent_user_messages_skips_ai_and_keeps_order() {
        let mut state = MoodState::fresh(at(0));
        state.push_recent(message("u1", Sender::User, 1));
        state.push_recent(message("a1", Sender::Ai, 2));
        state.push_recent(message("u2", Sender::User, 3));
        state.push_recent(message("u3", Sender::User, 4));

        let texts: Vec<&str> = state
            .recent_user_messages(2)
            .into_iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, vec!["u2", "u3"]);
    }

    #[test]
    fn record_moves_change_timestamp_only_on_label_change() {
        let mut state = MoodState::fresh(at(0));

        state.record_user_message("hi", Mood::Friendly, 5, at(10));
        assert_eq!(state.last_mood_change_timestamp, at(0));
        assert_eq!(state.conversation_context.last_user_message_timestamp, at(10));

        state.record_user_message("wow", Mood::Happy, 8, at(20));
        assert_eq!(state.last_mood_change_timestamp, at(20));
        assert_eq!(state.mood_intensity, 8);
    }

    #[test]
    fn record_tracks_user_apology_and_resets_ai_apology() {
        let mut state = MoodState::fresh(at(0));
        state.conversation_context.ai_apologized = true;

        state.record_user_message("So SORRY", Mood::Friendly, 5, at(1));
        assert!(state.conversation_context.user_apologized);
        assert!(!state.conversation_context.ai_apologized);

        state.record_user_message("ok", Mood::Friendly, 5, at(2));
        assert!(!state.conversation_context.user_apologized);
    }

    #[test]
    fn validate_rejects_out_of_range_intensity_and_oversized_window() {
        let mut state = MoodState::fresh(at(0));
        state.mood_intensity = 0;
        assert!(matches!(state.validate(), Err(TurnError::InvalidState(_))));

        let mut state = MoodState::fresh(at(0));
        for i in 0..11 {
            state
                .recent_messages
                .push_back(message("x", Sender::User, i));
        }
        assert!(matches!(state.validate(), Err(TurnError::InvalidState(_))));
    }

    #[test]
    fn deserializes_wire_format_with_legacy_aliases() {
        let raw = serde_json::json!({
            "currentMood": "slightly_annoyed",
            "moodIntensity": 3,
            "lastMoodChange": "2026-01-01T00:00:00.000Z",
            "recentMessages": [
                {"text": "hey", "timestamp": "2026-01-01T00:00:00.000Z", "sender": "user"}
            ],
            "conversationContext": {
                "userApologized": false,
                "aiApologized": false,
                "lastUserMessageTime": "2026-01-01T00:00:00.000Z"
            }
        });

        let state: MoodState = serde_json::from_value(raw).unwrap();
        assert_eq!(state.current_mood, Mood::SlightlyAnnoyed);
        assert_eq!(state.recent_messages.len(), 1);

        let out = serde_json::to_value(&state).unwrap();
        assert!(out.get("lastMoodChangeTimestamp").is_some());
        assert_eq!(out["currentMood"], "slightly_annoyed");
        assert!(
            out["conversationContext"]
                .get("lastUserMessageTimestamp")
                .is_some()
        );
    }

    #[test]
    fn eviction_holds_across_many_appends() {
        let mut state = MoodState::fresh(at(0));
        for i in 0..25 {
            state.record_user_message(&format!("m{i}"), Mood::Friendly, 5, at(0) + Duration::seconds(i));
            assert!(state.recent_messages.len() <= RECENT_MESSAGE_WINDOW);
        }
        assert_eq!(state.recent_messages.front().unwrap().text, "m15");
    }
}
