use serde::{Deserialize, Serialize};

/// How segmented fragments are delivered to the client.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ResponseGrouping {
    /// Every fragment becomes its own bubble.
    #[default]
    HumanLike,
    /// Fragments are joined into one bubble.
    Single,
    /// At most two bubbles.
    TwoMax,
}

impl ResponseGrouping {
    pub fn group(self, fragments: Vec<String>) -> Vec<String> {
        match self {
            Self::HumanLike => fragments,
            Self::Single => {
                if fragments.is_empty() {
                    fragments
                } else {
                    vec![fragments.join(" ")]
                }
            }
            Self::TwoMax => {
                if fragments.len() <= 2 {
                    return fragments;
                }
                let mid = fragments.len().div_ceil(2);
                vec![fragments[..mid].join(" "), fragments[mid..].join(" ")]
            }
        }
    }
}
