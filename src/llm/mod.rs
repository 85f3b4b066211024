// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod classify;
pub mod http_client;
pub mod scrub;
pub mod traits;

// ── Decorator layers ────────────────────────────────────────────────────────
pub mod factory;
pub mod reliable;

// ── Provider implementations ────────────────────────────────────────────────
pub mod gemini;

pub use classify::{FailureKind, classify_failure};
pub use factory::{
    attempt_timeout_secs, create_provider, create_resilient_provider, resolve_api_key,
};
pub use gemini::GeminiProvider;
pub use http_client::build_provider_client_with_timeout;
pub use reliable::ReliableProvider;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use traits::Provider;
