use super::super::{ChatConfig, GatewayConfig};
use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    pub api_key: Option<String>,
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub reliability: ReliabilityConfig,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.into()
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_temperature() -> f64 {
    0.7
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    #[serde(default = "default_provider_retries")]
    pub provider_retries: u32,
    #[serde(default = "default_provider_backoff_ms")]
    pub provider_backoff_ms: u64,
}

fn default_provider_retries() -> u32 {
    2
}

fn default_provider_backoff_ms() -> u64 {
    500
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            provider_retries: default_provider_retries(),
            provider_backoff_ms: default_provider_backoff_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());

        Self {
            config_path: home.join(".moodline").join("config.toml"),
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            chat: ChatConfig::default(),
            gateway: GatewayConfig::default(),
            reliability: ReliabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let busy = self.chat.busy_probability;
        if !(0.0..=1.0).contains(&busy) {
            return Err(ConfigError::Validation(format!(
                "chat.busy_probability must be within [0, 1], got {busy}"
            )));
        }
        if self.chat.generation_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "chat.generation_timeout_secs must be greater than 0".into(),
            ));
        }
        let temp = self.default_temperature;
        if !(0.0..=2.0).contains(&temp) {
            return Err(ConfigError::Validation(format!(
                "default_temperature must be within [0, 2], got {temp}"
            )));
        }
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::Validation("default_model must not be empty".into()));
        }
        Ok(())
    }

    /// Whether a credential is available from config or the environment.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
            || ["MOODLINE_API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"]
                .iter()
                .any(|name| std::env::var(name).is_ok_and(|v| !v.trim().is_empty()))
    }
}
