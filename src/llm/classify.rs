use crate::error::LlmError;

/// Coarse failure category of a generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    InvalidCredential,
    QuotaExceeded,
    Timeout,
    EmptyResponse,
    Generic,
}

impl FailureKind {
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::InvalidCredential | Self::QuotaExceeded)
    }
}

impl From<&LlmError> for FailureKind {
    fn from(err: &LlmError) -> Self {
        match err {
            LlmError::Auth { .. } => Self::InvalidCredential,
            LlmError::QuotaExceeded { .. } => Self::QuotaExceeded,
            LlmError::Timeout { .. } => Self::Timeout,
            LlmError::EmptyResponse { .. } => Self::EmptyResponse,
            LlmError::Request { .. } => Self::Generic,
        }
    }
}

/// Classify an error from a provider.
///
/// A typed [`LlmError`] anywhere in the chain wins; otherwise the message is
/// scanned for well-known provider markers.
pub fn classify_failure(err: &anyhow::Error) -> FailureKind {
    if let Some(llm) = err.chain().find_map(|cause| cause.downcast_ref::<LlmError>()) {
        return llm.into();
    }
    if err
        .chain()
        .any(|cause| cause.downcast_ref::<tokio::time::error::Elapsed>().is_some())
    {
        return FailureKind::Timeout;
    }
    if let Some(reqwest_err) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<reqwest::Error>())
    {
        if reqwest_err.is_timeout() {
            return FailureKind::Timeout;
        }
        if let Some(status) = reqwest_err.status() {
            return classify_status(status.as_u16(), "");
        }
    }
    classify_message(&format!("{err:#}"))
}

/// Classify by HTTP status, with the body checked for credential markers
/// first since Google reports a bad key as 400.
pub fn classify_status(status: u16, body: &str) -> FailureKind {
    match classify_message(body) {
        FailureKind::Generic => match status {
            401 | 403 => FailureKind::InvalidCredential,
            429 => FailureKind::QuotaExceeded,
            408 | 504 => FailureKind::Timeout,
            _ => FailureKind::Generic,
        },
        kind => kind,
    }
}

fn classify_message(message: &str) -> FailureKind {
    const CREDENTIAL_MARKERS: [&str; 4] = [
        "API_KEY_INVALID",
        "API key not valid",
        "PERMISSION_DENIED",
        "UNAUTHENTICATED",
    ];
    const QUOTA_MARKERS: [&str; 4] = [
        "QUOTA_EXCEEDED",
        "RESOURCE_EXHAUSTED",
        "insufficient_quota",
        "exceeded your current quota",
    ];

    if CREDENTIAL_MARKERS.iter().any(|m| message.contains(m)) || has_status(message, &[401, 403]) {
        return FailureKind::InvalidCredential;
    }
    if QUOTA_MARKERS.iter().any(|m| message.contains(m)) || has_status(message, &[429]) {
        return FailureKind::QuotaExceeded;
    }
    if message.contains("timed out") || message.contains("DEADLINE_EXCEEDED") {
        return FailureKind::Timeout;
    }
    FailureKind::Generic
}

/// Standalone three-digit status codes in free text.
fn has_status(message: &str, codes: &[u16]) -> bool {
    message
        .split(|c: char| !c.is_ascii_digit())
        .filter(|word| word.len() == 3)
        .filter_map(|word| word.parse::<u16>().ok())
        .any(|code| codes.contains(&code))
}
