//! Google Gemini provider (Generative Language API, `generateContent`).
//!
//! Key resolution: explicit key, then `GEMINI_API_KEY`, then `GOOGLE_API_KEY`.

use crate::error::LlmError;
use crate::llm::{
    build_provider_client_with_timeout,
    classify::{FailureKind, classify_status},
    sanitize_api_error,
    traits::Provider,
};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

mod types;
use types::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const PROVIDER_NAME: &str = "gemini";
const MAX_OUTPUT_TOKENS: u32 = 8192;

pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    client: Client,
    timeout_secs: u64,
}

impl GeminiProvider {
    pub fn new(api_key: Option<&str>, timeout_secs: u64) -> Self {
        let resolved_key = api_key
            .filter(|k| !k.trim().is_empty())
            .map(String::from)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|k| !k.trim().is_empty());

        Self {
            api_key: resolved_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: build_provider_client_with_timeout(timeout_secs),
            timeout_secs,
        }
    }

    /// Point the provider at another host (tests, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn model_name(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        }
    }

    fn build_request(
        system_prompt: Option<&str>,
        message: &str,
        temperature: f64,
    ) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: message.to_string(),
                }],
            }],
            system_instruction: system_prompt.map(|sys| Content {
                role: None,
                parts: vec![Part {
                    text: sys.to_string(),
                }],
            }),
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        }
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key.as_deref().ok_or_else(|| LlmError::Auth {
            provider: PROVIDER_NAME.to_string(),
            message: "Gemini API key not configured. Set GEMINI_API_KEY or api_key in config"
                .to_string(),
        })
    }

    fn error_for(kind: FailureKind, message: String, timeout_secs: u64) -> LlmError {
        let provider = PROVIDER_NAME.to_string();
        match kind {
            FailureKind::InvalidCredential => LlmError::Auth { provider, message },
            FailureKind::QuotaExceeded => LlmError::QuotaExceeded { provider, message },
            FailureKind::Timeout => LlmError::Timeout {
                provider,
                after_secs: timeout_secs,
            },
            FailureKind::EmptyResponse => LlmError::EmptyResponse { provider },
            FailureKind::Generic => LlmError::Request { provider, message },
        }
    }

    async fn ensure_success_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorEnvelope>(&body).map_or_else(
            |_| body.clone(),
            |envelope| {
                let api_status = envelope.error.status.unwrap_or_default();
                format!("{api_status} {}", envelope.error.message)
                    .trim()
                    .to_string()
            },
        );
        let kind = classify_status(status.as_u16(), &body);
        let message = format!("HTTP {status}: {}", sanitize_api_error(&detail));
        Err(Self::error_for(kind, message, self.timeout_secs))
    }

    fn extract_text(result: &GenerateContentResponse) -> Result<String, LlmError> {
        if let Some(err) = result.error.as_ref() {
            let marker = err.status.as_deref().unwrap_or_default();
            let kind = classify_status(err.code.unwrap_or_default(), marker);
            let message = sanitize_api_error(&format!("{marker} {}", err.message));
            return Err(Self::error_for(kind, message.trim().to_string(), 0));
        }

        let text = result
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: PROVIDER_NAME.to_string(),
            });
        }
        Ok(text)
    }

    async fn call_api(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        model: &str,
        temperature: f64,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/v1beta/{}:generateContent?key={api_key}",
            self.base_url,
            Self::model_name(model)
        );
        let request = Self::build_request(system_prompt, message, temperature);

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        let response = self.ensure_success_status(response).await?;

        let result: GenerateContentResponse =
            response.json().await.map_err(|e| self.transport_error(&e))?;
        Self::extract_text(&result)
    }

    fn transport_error(&self, err: &reqwest::Error) -> LlmError {
        if err.is_timeout() {
            return LlmError::Timeout {
                provider: PROVIDER_NAME.to_string(),
                after_secs: self.timeout_secs,
            };
        }
        LlmError::Request {
            provider: PROVIDER_NAME.to_string(),
            message: sanitize_api_error(&err.to_string()),
        }
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn chat_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        message: &'a str,
        model: &'a str,
        temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let text = self
                .call_api(system_prompt, message, model, temperature)
                .await?;
            Ok(text)
        })
    }
}
