use super::table::Mood;
use crate::chat::transcript::HistoryMessage;

/// Keyword rules in precedence order; the first rule with a hit wins.
const TONE_RULES: &[(Mood, &[&str])] = &[
    (Mood::Apologetic, &["sorry", "apologize", "my bad"]),
    (
        Mood::Happy,
        &["!", "awesome", "great", "amazing", "love", "excited"],
    ),
    (
        Mood::Annoyed,
        &["stupid", "annoying", "hate", "angry", "frustrated", "wtf"],
    ),
    (Mood::Sad, &["sad", "depressed", "down", "upset", "crying"]),
    (Mood::Friendly, &["?", "help", "how"]),
];

/// Map a user message to the mood the AI should drift toward.
///
/// `history` is accepted for future rules and currently ignored.
pub fn classify_tone(message: &str, _history: &[HistoryMessage]) -> Mood {
    let lower = message.to_lowercase();
    TONE_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(Mood::Neutral, |(mood, _)| *mood)
}
