//! Static mood table and transition graph.
//!
//! Both are read-only lookups resolved through `match`, so there is no
//! global to mutate at runtime.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The closed set of AI mood labels.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mood {
    Happy,
    #[default]
    Friendly,
    Neutral,
    SlightlyAnnoyed,
    Annoyed,
    Angry,
    Apologetic,
    Excited,
    Sad,
    Busy,
}

/// Canonical intensity and descriptive traits for one mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodDefinition {
    pub intensity: u8,
    pub traits: &'static [&'static str],
}

/// Neighbor list used for moods missing from the graph.
const FALLBACK_NEIGHBORS: &[Mood] = &[Mood::Neutral];

impl Mood {
    pub fn definition(self) -> MoodDefinition {
        let (intensity, traits): (u8, &'static [&'static str]) = match self {
            Self::Happy => (8, &["enthusiastic", "positive", "energetic"]),
            Self::Friendly => (5, &["warm", "helpful", "casual"]),
            Self::Neutral => (5, &["balanced", "calm", "straightforward"]),
            Self::SlightlyAnnoyed => (3, &["short responses", "less enthusiastic"]),
            Self::Annoyed => (2, &["curt", "impatient", "direct"]),
            Self::Angry => (1, &["frustrated", "sharp", "defensive"]),
            Self::Apologetic => (4, &["sorry", "understanding", "gentle"]),
            Self::Excited => (9, &["very enthusiastic", "lots of emojis", "exclamations"]),
            Self::Sad => (3, &["melancholy", "quiet", "thoughtful"]),
            Self::Busy => (4, &["brief", "distracted", "hurried"]),
        };
        MoodDefinition { intensity, traits }
    }

    /// Canonical 1-10 intensity from the mood table.
    pub fn canonical_intensity(self) -> u8 {
        self.definition().intensity
    }

    pub fn traits(self) -> &'static [&'static str] {
        self.definition().traits
    }

    /// Directed adjacency list of the transition graph, in preference order.
    pub fn neighbors(self) -> &'static [Mood] {
        match self {
            Self::Happy => &[Self::Excited, Self::Friendly, Self::Neutral],
            Self::Excited => &[Self::Happy, Self::Friendly, Self::Neutral],
            Self::Friendly => &[Self::Happy, Self::Neutral, Self::SlightlyAnnoyed],
            Self::Neutral => &[Self::Friendly, Self::SlightlyAnnoyed, Self::Sad],
            Self::SlightlyAnnoyed => &[Self::Neutral, Self::Annoyed, Self::Friendly],
            Self::Annoyed => &[Self::SlightlyAnnoyed, Self::Angry, Self::Neutral],
            Self::Angry => &[Self::Annoyed, Self::SlightlyAnnoyed, Self::Neutral],
            Self::Sad => &[Self::Neutral, Self::Friendly, Self::Apologetic],
            Self::Apologetic => &[Self::Friendly, Self::Neutral, Self::Sad],
            Self::Busy => &[Self::Neutral, Self::Friendly, Self::SlightlyAnnoyed],
        }
    }

    /// Neighbors for an arbitrary wire label; unknown labels fall back to
    /// `[neutral]`.
    pub fn neighbors_for_label(label: &str) -> &'static [Mood] {
        label
            .parse::<Mood>()
            .map_or(FALLBACK_NEIGHBORS, Mood::neighbors)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
