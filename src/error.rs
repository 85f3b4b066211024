use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `moodline`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum MoodlineError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── LLM / Provider ──────────────────────────────────────────────────
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    // ── Turn ────────────────────────────────────────────────────────────
    #[error("turn: {0}")]
    Turn(#[from] TurnError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

/// Failures reported by a text-generation provider.
///
/// The turn orchestrator degrades every variant to the same cancel-typing
/// reply, but logs each one distinctly.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider {provider} authentication failed: {message}")]
    Auth { provider: String, message: String },

    #[error("provider {provider} quota exceeded: {message}")]
    QuotaExceeded { provider: String, message: String },

    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} timed out after {after_secs}s")]
    Timeout { provider: String, after_secs: u64 },

    #[error("provider {provider} returned an empty response")]
    EmptyResponse { provider: String },
}

// ─── Turn errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TurnError {
    /// Caller input error: rejected before any mood mutation.
    #[error("message is required")]
    MissingMessage,

    /// Malformed caller-held state. Fatal for the turn and never folded into
    /// the generation degrade path.
    #[error("invalid mood state: {0}")]
    InvalidState(String),

    #[error("prompt rendering failed: {0}")]
    Prompt(String),
}

pub type Result<T> = std::result::Result<T, MoodlineError>;
