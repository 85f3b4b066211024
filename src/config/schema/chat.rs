use crate::chat::delivery::TypingPacing;
use crate::mood::ResponseGrouping;
use crate::mood::filter::DEFAULT_BUSY_PROBABILITY;
use serde::{Deserialize, Serialize};

/// Turn behavior defaults (`[chat]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Grouping used when a request does not name one.
    #[serde(default)]
    pub default_grouping: ResponseGrouping,
    /// Chance per turn of the "busy" canned reply.
    #[serde(default = "default_busy_probability")]
    pub busy_probability: f64,
    /// Upper bound on a single generation call.
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
    /// Persona text used by the CLI when `--persona` is not given.
    #[serde(default)]
    pub persona: Option<String>,
    #[serde(default)]
    pub typing: TypingPacing,
    /// Fixed RNG seed for the busy filter and canned replies (reproducible runs).
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_busy_probability() -> f64 {
    DEFAULT_BUSY_PROBABILITY
}

fn default_generation_timeout_secs() -> u64 {
    120
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_grouping: ResponseGrouping::default(),
            busy_probability: default_busy_probability(),
            generation_timeout_secs: default_generation_timeout_secs(),
            persona: None,
            typing: TypingPacing::default(),
            seed: None,
        }
    }
}
