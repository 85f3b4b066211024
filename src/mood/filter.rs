//! Pre-generation message filter.
//!
//! Rules run in order and the first match wins:
//! 1. repetition of an identical message,
//! 2. bursts of very short messages,
//! 3. a random "busy" short-circuit.

use super::random::RandomSource;
use super::state::MoodState;
use super::table::Mood;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of most recent user messages the filter looks at.
pub const FILTER_LOOKBACK: usize = 5;
/// Identical messages already in the lookback that trigger the repetition rule.
pub const REPETITION_THRESHOLD: usize = 2;
/// Messages at or below this many characters count as "short".
pub const SHORT_MESSAGE_MAX_CHARS: usize = 3;
/// Short messages within the spam window that trigger the spam rule.
pub const SPAM_THRESHOLD: usize = 3;
pub const SPAM_WINDOW_SECS: i64 = 30;
pub const DEFAULT_BUSY_PROBABILITY: f64 = 0.05;

pub const REPETITION_RESPONSES: [&str; 5] = [
    "I think you already said that! 😅",
    "You're repeating yourself there!",
    "I heard you the first time! 😊",
    "Same message again? Everything okay?",
    "I got it already! Let's talk about something else?",
];
pub const SPAM_RESPONSE: &str = "Slow down there! What's really on your mind? 🤔";
pub const BUSY_RESPONSE: &str = "Give me a sec, I'm thinking about something else right now...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FilterReason {
    Repetitive,
    Spam,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterVerdict {
    pub should_filter: bool,
    pub reason: Option<FilterReason>,
    pub canned_response: Option<String>,
}

impl FilterVerdict {
    pub fn pass() -> Self {
        Self {
            should_filter: false,
            reason: None,
            canned_response: None,
        }
    }

    fn filtered(reason: FilterReason, response: &str) -> Self {
        Self {
            should_filter: true,
            reason: Some(reason),
            canned_response: Some(response.to_string()),
        }
    }
}

pub struct MessageFilter {
    random: Arc<dyn RandomSource>,
    busy_probability: f64,
}

impl MessageFilter {
    pub fn new(random: Arc<dyn RandomSource>, busy_probability: f64) -> Self {
        Self {
            random,
            busy_probability: busy_probability.clamp(0.0, 1.0),
        }
    }

    pub fn check(&self, message: &str, state: &MoodState, now: DateTime<Utc>) -> FilterVerdict {
        let recent = state.recent_user_messages(FILTER_LOOKBACK);
        let normalized = message.trim().to_lowercase();

        let identical = recent
            .iter()
            .filter(|m| m.text.trim().to_lowercase() == normalized)
            .count();
        if identical >= REPETITION_THRESHOLD {
            let pick = self.random.index(REPETITION_RESPONSES.len());
            return FilterVerdict::filtered(FilterReason::Repetitive, REPETITION_RESPONSES[pick]);
        }

        // Each message is judged against its own timestamp, not a window
        // anchored to the incoming message.
        let window = Duration::seconds(SPAM_WINDOW_SECS);
        let short_recent = recent
            .iter()
            .filter(|m| is_short(&m.text) && now.signed_duration_since(m.timestamp) < window)
            .count();
        if short_recent >= SPAM_THRESHOLD && is_short(message) {
            return FilterVerdict::filtered(FilterReason::Spam, SPAM_RESPONSE);
        }

        if state.current_mood != Mood::Busy && self.random.next_f64() < self.busy_probability {
            return FilterVerdict::filtered(FilterReason::Busy, BUSY_RESPONSE);
        }

        FilterVerdict::pass()
    }
}

fn is_short(text: &str) -> bool {
    text.trim().chars().count() <= SHORT_MESSAGE_MAX_CHARS
}
