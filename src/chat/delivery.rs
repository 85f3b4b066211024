//! Client-side pacing of a turn's bubbles.
//!
//! The engine returns all bubbles at once; a client plays them back with a
//! per-bubble typing delay and plays a cancel-typing sentinel as an indicator
//! that appears and then goes away without a message.

use super::turn::OutboundMessage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CANCEL_TYPING_PREFIX: &str = "::cancel_typing::";

/// Typing indicator timing used by the chat client.
///
/// A bubble is "typed" for `chars * per_char_ms`; a cancel sentinel carrying
/// `N` shows the indicator for `N * per_char_ms` and then disappears. The gap
/// between consecutive entries applies even with the indicator disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingPacing {
    pub enabled: bool,
    pub per_char_ms: u64,
    pub gap_ms: u64,
}

impl Default for TypingPacing {
    fn default() -> Self {
        Self {
            enabled: true,
            per_char_ms: 190,
            gap_ms: 300,
        }
    }
}

impl TypingPacing {
    pub fn delay_for(&self, text: &str) -> Duration {
        self.typing_for_units(text.chars().count() as u64)
    }

    /// Indicator time for a cancel sentinel carrying `number`.
    pub fn cancel_typing_for(&self, number: u32) -> Duration {
        self.typing_for_units(u64::from(number))
    }

    pub fn gap(&self) -> Duration {
        Duration::from_millis(self.gap_ms)
    }

    fn typing_for_units(&self, units: u64) -> Duration {
        if !self.enabled {
            return Duration::ZERO;
        }
        Duration::from_millis(units.saturating_mul(self.per_char_ms))
    }
}

/// Typing delay with the default pacing.
pub fn typing_delay(text: &str) -> Duration {
    TypingPacing::default().delay_for(text)
}

/// `Some(n)` when `text` is exactly `::cancel_typing::<digits>`.
pub fn parse_cancel_typing(text: &str) -> Option<u32> {
    let digits = text.strip_prefix(CANCEL_TYPING_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStep {
    /// Show the typing indicator for `typing`, reveal `text`, then wait
    /// `gap_after` before the next entry.
    Show {
        text: String,
        typing: Duration,
        gap_after: Duration,
    },
    /// Typing indicator only; nothing is revealed.
    CancelTyping { number: u32, typing: Duration },
}

/// Turn a batch of bubbles into the ordered playback steps.
pub fn plan_delivery(messages: &[OutboundMessage], pacing: &TypingPacing) -> Vec<DeliveryStep> {
    let last = messages.len().saturating_sub(1);
    messages
        .iter()
        .enumerate()
        .map(|(i, message)| match parse_cancel_typing(&message.text) {
            Some(number) => DeliveryStep::CancelTyping {
                number,
                typing: pacing.cancel_typing_for(number),
            },
            None => DeliveryStep::Show {
                text: message.text.clone(),
                typing: pacing.delay_for(&message.text),
                gap_after: if i < last { pacing.gap() } else { Duration::ZERO },
            },
        })
        .collect()
}

/// Messages typed while a turn is in flight, sent together afterwards.
#[derive(Debug, Default)]
pub struct PendingQueue {
    in_flight: bool,
    queued: Vec<String>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Returns `Some(message)` when it may be sent now, otherwise queues it.
    pub fn submit(&mut self, message: String) -> Option<String> {
        if self.in_flight {
            self.queued.push(message);
            None
        } else {
            self.in_flight = true;
            Some(message)
        }
    }

    /// Mark the in-flight turn done. Returns the coalesced follow-up, which is
    /// then in flight itself.
    pub fn complete(&mut self) -> Option<String> {
        self.in_flight = false;
        let next = self.coalesce()?;
        self.in_flight = true;
        Some(next)
    }

    /// Drain queued messages into one newline-joined message.
    pub fn coalesce(&mut self) -> Option<String> {
        if self.queued.is_empty() {
            return None;
        }
        let joined = self.queued.join("\n");
        self.queued.clear();
        Some(joined)
    }
}
