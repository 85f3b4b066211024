//! One request/response cycle of the mood-adaptive chat engine.

use super::transcript::{HistoryMessage, render_generation_input};
use crate::config::Config;
use crate::error::{MoodlineError, TurnError};
use crate::llm::{
    FailureKind, Provider, classify_failure, create_resilient_provider, sanitize_api_error,
};
use crate::mood::{
    FilterReason, MessageFilter, Mood, MoodState, RandomSource, ResponseGrouping, Segmenter,
    classify_tone, next_mood,
};
use crate::prompt::PromptSynthesizer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Inclusive bounds of the number carried by a degraded reply.
pub const CANCEL_TYPING_MIN: u32 = 10;
pub const CANCEL_TYPING_MAX: u32 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<HistoryMessage>,
    #[serde(default, alias = "aiState")]
    pub mood_state: Option<MoodState>,
    #[serde(default, alias = "aiResponseGrouping")]
    pub response_grouping_mode: Option<ResponseGrouping>,
    #[serde(default, alias = "customAIBehavior")]
    pub custom_persona_behavior: Option<String>,
}

impl TurnRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodInfo {
    pub current_mood: Mood,
    pub intensity: u8,
    pub previous_mood: Mood,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub messages: Vec<OutboundMessage>,
    pub mood_state: MoodState,
    pub filtered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_reason: Option<FilterReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_info: Option<MoodInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    Filtering,
    ShortCircuited,
    Classifying,
    Transitioning,
    Prompting,
    Generating,
    Segmenting,
    Grouping,
    Done,
}

/// Static parameters of an orchestrator.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub model: String,
    pub temperature: f64,
    pub generation_timeout: Duration,
    pub busy_probability: f64,
    pub default_grouping: ResponseGrouping,
}

impl TurnSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.default_model.clone(),
            temperature: config.default_temperature,
            generation_timeout: Duration::from_secs(config.chat.generation_timeout_secs),
            busy_probability: config.chat.busy_probability,
            default_grouping: config.chat.default_grouping,
        }
    }
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct TurnOrchestrator {
    provider: Arc<dyn Provider>,
    settings: TurnSettings,
    random: Arc<dyn RandomSource>,
    filter: MessageFilter,
    segmenter: Segmenter,
    prompts: PromptSynthesizer,
}

impl TurnOrchestrator {
    pub fn new(
        provider: Arc<dyn Provider>,
        settings: TurnSettings,
        random: Arc<dyn RandomSource>,
    ) -> anyhow::Result<Self> {
        let filter = MessageFilter::new(Arc::clone(&random), settings.busy_probability);
        Ok(Self {
            provider,
            settings,
            random,
            filter,
            segmenter: Segmenter::default(),
            prompts: PromptSynthesizer::new()?,
        })
    }

    /// Validate `config` and build an orchestrator around its provider.
    pub fn from_config(
        config: &Config,
        random: Arc<dyn RandomSource>,
    ) -> crate::error::Result<Self> {
        config.validate()?;
        let provider = create_resilient_provider(config)?;
        Self::new(provider, TurnSettings::from_config(config), random).map_err(MoodlineError::from)
    }

    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    pub async fn run_turn(&self, request: TurnRequest) -> Result<TurnResponse, TurnError> {
        self.run_turn_at(request, Utc::now()).await
    }

    /// Run one turn with `now` as the turn clock.
    pub async fn run_turn_at(
        &self,
        request: TurnRequest,
        now: DateTime<Utc>,
    ) -> Result<TurnResponse, TurnError> {
        let turn_id = Uuid::new_v4();
        trace_phase(turn_id, TurnPhase::Idle);

        let TurnRequest {
            message,
            conversation_history,
            mood_state,
            response_grouping_mode,
            custom_persona_behavior,
        } = request;

        if message.trim().is_empty() {
            return Err(TurnError::MissingMessage);
        }
        let mut state = mood_state.unwrap_or_else(|| MoodState::fresh(now));
        state.validate()?;
        let previous_mood = state.current_mood;
        let grouping = response_grouping_mode.unwrap_or(self.settings.default_grouping);

        trace_phase(turn_id, TurnPhase::Filtering);
        let verdict = self.filter.check(&message, &state, now);
        if let (true, Some(reply)) = (verdict.should_filter, verdict.canned_response) {
            trace_phase(turn_id, TurnPhase::ShortCircuited);
            let (mood, intensity) = (state.current_mood, state.mood_intensity);
            state.record_user_message(&message, mood, intensity, now);
            tracing::info!(
                turn_id = %turn_id,
                reason = ?verdict.reason,
                mood = %mood,
                "Message filtered"
            );
            return Ok(TurnResponse {
                messages: vec![OutboundMessage {
                    text: reply,
                    timestamp: now,
                }],
                mood_state: state,
                filtered: true,
                filter_reason: verdict.reason,
                mood_info: None,
            });
        }

        trace_phase(turn_id, TurnPhase::Classifying);
        let desired = classify_tone(&message, &conversation_history);

        trace_phase(turn_id, TurnPhase::Transitioning);
        let transition = next_mood(state.current_mood, desired);
        tracing::info!(
            turn_id = %turn_id,
            from = %state.current_mood,
            desired = %desired,
            to = %transition.mood,
            intensity = transition.intensity,
            rule = %transition.rule,
            "Mood transition"
        );
        state.record_user_message(&message, transition.mood, transition.intensity, now);

        trace_phase(turn_id, TurnPhase::Prompting);
        let system_prompt = self
            .prompts
            .system_prompt(
                transition.mood,
                transition.intensity,
                custom_persona_behavior.as_deref(),
                grouping,
            )
            .map_err(|e| TurnError::Prompt(format!("{e:#}")))?;
        let input = render_generation_input(&system_prompt, &conversation_history, &message);

        trace_phase(turn_id, TurnPhase::Generating);
        let raw = match self.generate(turn_id, &input).await {
            Ok(text) => text,
            Err(kind) => {
                let reply = self.degraded_reply();
                tracing::info!(turn_id = %turn_id, %kind, reply = %reply, "Turn degraded");
                return Ok(TurnResponse {
                    messages: vec![OutboundMessage {
                        text: reply,
                        timestamp: now,
                    }],
                    mood_state: state,
                    filtered: false,
                    filter_reason: None,
                    mood_info: None,
                });
            }
        };

        trace_phase(turn_id, TurnPhase::Segmenting);
        let fragments = self.segmenter.segment(&raw);

        trace_phase(turn_id, TurnPhase::Grouping);
        let messages = grouping
            .group(fragments)
            .into_iter()
            .map(|text| OutboundMessage {
                text,
                timestamp: now,
            })
            .collect::<Vec<_>>();

        trace_phase(turn_id, TurnPhase::Done);
        tracing::debug!(turn_id = %turn_id, bubbles = messages.len(), %grouping, "Turn complete");

        Ok(TurnResponse {
            messages,
            mood_state: state,
            filtered: false,
            filter_reason: None,
            mood_info: Some(MoodInfo {
                current_mood: transition.mood,
                intensity: transition.intensity,
                previous_mood,
            }),
        })
    }

    /// The only external call of a turn. Every failure is reported as a
    /// [`FailureKind`] after being logged.
    async fn generate(&self, turn_id: Uuid, input: &str) -> Result<String, FailureKind> {
        let call = self
            .provider
            .chat(input, &self.settings.model, self.settings.temperature);

        let outcome = tokio::time::timeout(self.settings.generation_timeout, call).await;
        let provider = self.provider.name();

        match outcome {
            Ok(Ok(text)) if !text.trim().is_empty() => Ok(text),
            Ok(Ok(_)) => {
                tracing::warn!(turn_id = %turn_id, provider, "Generation returned empty output");
                Err(FailureKind::EmptyResponse)
            }
            Ok(Err(e)) => {
                let kind = classify_failure(&e);
                let detail = sanitize_api_error(&format!("{e:#}"));
                match kind {
                    FailureKind::InvalidCredential => tracing::error!(
                        turn_id = %turn_id,
                        provider,
                        error = %detail,
                        "Generation rejected: invalid API credential"
                    ),
                    FailureKind::QuotaExceeded => tracing::warn!(
                        turn_id = %turn_id,
                        provider,
                        error = %detail,
                        "Generation quota exceeded"
                    ),
                    FailureKind::Timeout => tracing::warn!(
                        turn_id = %turn_id,
                        provider,
                        error = %detail,
                        "Generation request timed out"
                    ),
                    FailureKind::EmptyResponse => tracing::warn!(
                        turn_id = %turn_id,
                        provider,
                        "Generation returned empty output"
                    ),
                    FailureKind::Generic => tracing::error!(
                        turn_id = %turn_id,
                        provider,
                        error = %detail,
                        "Generation failed"
                    ),
                }
                Err(kind)
            }
            Err(_) => {
                tracing::warn!(
                    turn_id = %turn_id,
                    provider,
                    timeout_secs = self.settings.generation_timeout.as_secs(),
                    "Generation exceeded turn timeout"
                );
                Err(FailureKind::Timeout)
            }
        }
    }

    fn degraded_reply(&self) -> String {
        let n = self
            .random
            .range_inclusive(CANCEL_TYPING_MIN, CANCEL_TYPING_MAX);
        format!("::cancel_typing::{n}")
    }
}

fn trace_phase(turn_id: Uuid, phase: TurnPhase) {
    tracing::debug!(turn_id = %turn_id, %phase, "Turn phase");
}
