use super::classify::classify_failure;
use super::traits::Provider;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const MIN_BACKOFF_MS: u64 = 50;
const MAX_BACKOFF_MS: u64 = 10_000;

/// Provider wrapper with bounded retry and exponential backoff.
///
/// Credential and quota failures return immediately; the last error is
/// returned unchanged so callers can still classify it.
pub struct ReliableProvider {
    inner: Box<dyn Provider>,
    max_retries: u32,
    base_backoff_ms: u64,
}

impl ReliableProvider {
    pub fn new(inner: Box<dyn Provider>, max_retries: u32, base_backoff_ms: u64) -> Self {
        Self {
            inner,
            max_retries,
            base_backoff_ms: base_backoff_ms.max(MIN_BACKOFF_MS),
        }
    }
}

impl Provider for ReliableProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let provider = self.inner.name();
            let mut backoff_ms = self.base_backoff_ms;
            let mut attempt = 0;

            loop {
                match self
                    .inner
                    .chat_with_system(system_prompt, message, model, temperature)
                    .await
                {
                    Ok(reply) => {
                        if attempt > 0 {
                            tracing::info!(provider, attempt, "Provider recovered after retries");
                        }
                        return Ok(reply);
                    }
                    Err(e) => {
                        let kind = classify_failure(&e);
                        if !kind.is_retryable() {
                            tracing::warn!(provider, %kind, "Non-retryable provider error");
                            return Err(e);
                        }
                        if attempt >= self.max_retries {
                            tracing::warn!(
                                provider,
                                %kind,
                                attempts = attempt + 1,
                                "Provider retries exhausted"
                            );
                            return Err(e);
                        }

                        attempt += 1;
                        tracing::warn!(
                            provider,
                            %kind,
                            attempt,
                            max_retries = self.max_retries,
                            backoff_ms,
                            "Provider call failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                        backoff_ms = backoff_ms.saturating_mul(2).min(MAX_BACKOFF_MS);
                    }
                }
            }
        })
    }
}
