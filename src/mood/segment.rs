//! Splits one generated reply into short chat bubbles.
//!
//! Splitting is a chain of [`SplitStrategy`] tiers; the first tier whose raw
//! split has more than one piece wins, and its empty pieces are then dropped.
//! Post-processing then forces a split of long
//! single fragments, trims, caps the count and tries a connector split.

use regex::Regex;
use std::sync::LazyLock;

pub const MAX_FRAGMENTS: usize = 5;
/// Text longer than this is packed word-wise when no punctuation split applies.
pub const WORD_PACK_THRESHOLD: usize = 30;
pub const WORD_PACK_CHUNK: usize = 25;
/// A lone fragment longer than this is split near its midpoint.
pub const MIDPOINT_SPLIT_THRESHOLD: usize = 20;
/// A lone fragment longer than this is split on a connector word.
pub const CONNECTOR_SPLIT_THRESHOLD: usize = 15;
pub const CONNECTORS: [&str; 8] = ["and", "but", "so", "also", "plus", "btw", "oh", "yeah"];

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence end pattern is valid"));

static CONJUNCTION_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",\s+(?:and|but|so|or|yet)\s+|,\s+").expect("conjunction pattern is valid")
});

static CONNECTOR_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    CONNECTORS
        .iter()
        .map(|word| {
            let pattern = Regex::new(&format!(r"(?i)\s+{word}\s+"))
                .expect("connector pattern is valid");
            (*word, pattern)
        })
        .collect()
});

/// One tier of the splitting cascade.
pub trait SplitStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw pieces; may contain empty or untrimmed strings.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Newlines, ellipses, and `.`/`!`/`?` + whitespace before a capital letter.
pub struct NaturalBreaks;

impl SplitStrategy for NaturalBreaks {
    fn name(&self) -> &'static str {
        "natural_breaks"
    }

    fn split(&self, text: &str) -> Vec<String> {
        let bytes = text.as_bytes();
        let mut pieces = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < bytes.len() {
            let delimiter_end = match bytes[i] {
                b'\n' => Some(i + 1),
                b'.' if bytes[i..].starts_with(b"...") => Some(i + 3),
                b'.' | b'!' | b'?' => {
                    let ws_end = text[i + 1..]
                        .char_indices()
                        .find(|(_, c)| !c.is_whitespace())
                        .map_or(text.len(), |(offset, _)| i + 1 + offset);
                    let has_ws = ws_end > i + 1;
                    let capital_follows = bytes.get(ws_end).is_some_and(u8::is_ascii_uppercase);
                    (has_ws && capital_follows).then_some(ws_end)
                }
                _ => None,
            };

            if let Some(end) = delimiter_end {
                pieces.push(text[start..i].to_string());
                start = end;
                i = end;
            } else {
                i += 1;
            }
        }
        pieces.push(text[start..].to_string());
        pieces
    }
}

/// Whitespace after sentence-ending punctuation; the punctuation stays.
pub struct SentenceBoundaries;

impl SplitStrategy for SentenceBoundaries {
    fn name(&self) -> &'static str {
        "sentence_boundaries"
    }

    fn split(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut start = 0;
        for m in SENTENCE_END.find_iter(text) {
            let keep_to = m.start() + 1;
            pieces.push(text[start..keep_to].to_string());
            start = m.end();
        }
        pieces.push(text[start..].to_string());
        pieces
    }
}

/// `, and|but|so|or|yet ` or a plain `, `.
pub struct ConjunctionCommas;

impl SplitStrategy for ConjunctionCommas {
    fn name(&self) -> &'static str {
        "conjunction_commas"
    }

    fn split(&self, text: &str) -> Vec<String> {
        CONJUNCTION_COMMA.split(text).map(str::to_string).collect()
    }
}

/// Greedy word packing for long unpunctuated text.
pub struct WordPacking;

impl SplitStrategy for WordPacking {
    fn name(&self) -> &'static str {
        "word_packing"
    }

    fn split(&self, text: &str) -> Vec<String> {
        if char_len(text) <= WORD_PACK_THRESHOLD {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut current = String::new();
        for word in text.split(' ') {
            if !current.is_empty() && char_len(&current) + char_len(word) + 1 > WORD_PACK_CHUNK {
                chunks.push(current.trim().to_string());
                current = word.to_string();
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            chunks.push(current.trim().to_string());
        }
        chunks
    }
}

pub struct Segmenter {
    strategies: Vec<Box<dyn SplitStrategy>>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::with_strategies(vec![
            Box::new(NaturalBreaks),
            Box::new(SentenceBoundaries),
            Box::new(ConjunctionCommas),
            Box::new(WordPacking),
        ])
    }
}

impl Segmenter {
    pub fn with_strategies(strategies: Vec<Box<dyn SplitStrategy>>) -> Self {
        Self { strategies }
    }

    /// Split `raw` into at most [`MAX_FRAGMENTS`] trimmed, non-empty bubbles.
    /// Blank input yields no fragments.
    pub fn segment(&self, raw: &str) -> Vec<String> {
        let text = raw.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let mut fragments = self.cascade(text);

        if let [only] = fragments.as_slice()
            && char_len(only) > MIDPOINT_SPLIT_THRESHOLD
            && let Some((head, tail)) = split_near_midpoint(only)
        {
            fragments = vec![head, tail];
        }

        let mut fragments: Vec<String> = fragments
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        fragments.truncate(MAX_FRAGMENTS);

        if let [only] = fragments.as_slice()
            && char_len(only) > CONNECTOR_SPLIT_THRESHOLD
            && let Some(pair) = split_on_connector(only)
        {
            fragments = pair;
        }

        fragments
    }

    fn cascade(&self, text: &str) -> Vec<String> {
        for strategy in &self.strategies {
            let raw = strategy.split(text);
            if raw.len() < 2 {
                continue;
            }
            let pieces: Vec<String> = raw.into_iter().filter(|p| !p.trim().is_empty()).collect();
            // a split made only of delimiters falls through
            if !pieces.is_empty() {
                tracing::trace!(strategy = strategy.name(), pieces = pieces.len(), "reply split");
                return pieces;
            }
        }
        vec![text.to_string()]
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split at the last space at or before the character midpoint.
fn split_near_midpoint(text: &str) -> Option<(String, String)> {
    let midpoint = char_len(text) / 2;
    let split_byte = text
        .char_indices()
        .take(midpoint + 1)
        .filter(|(_, c)| *c == ' ')
        .map(|(byte, _)| byte)
        .last()
        .filter(|byte| *byte > 0)?;

    Some((
        text[..split_byte].trim().to_string(),
        text[split_byte..].trim().to_string(),
    ))
}

/// Split on the first connector word (priority order), keeping the connector
/// at the start of the second half.
fn split_on_connector(text: &str) -> Option<Vec<String>> {
    CONNECTOR_PATTERNS.iter().find_map(|(word, pattern)| {
        let parts: Vec<&str> = pattern.split(text).collect();
        if parts.len() < 2 {
            return None;
        }
        let rest = parts[1..].join(&format!(" {word} "));
        Some(vec![
            parts[0].trim().to_string(),
            format!("{word} {}", rest.trim()),
        ])
    })
}
