use super::gemini::GeminiProvider;
use super::reliable::ReliableProvider;
use super::traits::Provider;
use crate::config::Config;
use std::sync::Arc;

/// Resolve the credential for `name`: explicit key first, then the
/// provider's environment variables, then `MOODLINE_API_KEY`.
pub fn resolve_api_key(name: &str, explicit_api_key: Option<&str>) -> Option<String> {
    if let Some(key) = explicit_api_key.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    let provider_env: &[&str] = match name {
        "gemini" | "google" | "google-gemini" => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        _ => &[],
    };

    provider_env
        .iter()
        .chain(std::iter::once(&"MOODLINE_API_KEY"))
        .filter_map(|var| std::env::var(var).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Build the bare provider named `name`.
pub fn create_provider(
    name: &str,
    api_key: Option<&str>,
    timeout_secs: u64,
) -> anyhow::Result<Box<dyn Provider>> {
    let key = resolve_api_key(name, api_key);
    match name {
        "gemini" | "google" | "google-gemini" => {
            Ok(Box::new(GeminiProvider::new(key.as_deref(), timeout_secs)))
        }
        other => anyhow::bail!("Unknown provider: {other}. Supported: gemini"),
    }
}

/// HTTP timeout of a single attempt: the generation budget split across the
/// first call and every retry, never below one second.
pub fn attempt_timeout_secs(generation_timeout_secs: u64, retries: u32) -> u64 {
    (generation_timeout_secs / (u64::from(retries) + 1)).max(1)
}

/// Build the configured provider wrapped in retry/backoff.
pub fn create_resilient_provider(config: &Config) -> anyhow::Result<Arc<dyn Provider>> {
    let per_attempt = attempt_timeout_secs(
        config.chat.generation_timeout_secs,
        config.reliability.provider_retries,
    );
    tracing::debug!(
        provider = %config.default_provider,
        per_attempt_secs = per_attempt,
        retries = config.reliability.provider_retries,
        "Building provider"
    );
    let inner = create_provider(
        &config.default_provider,
        config.api_key.as_deref(),
        per_attempt,
    )?;
    Ok(Arc::new(ReliableProvider::new(
        inner,
        config.reliability.provider_retries,
        config.reliability.provider_backoff_ms,
    )))
}
