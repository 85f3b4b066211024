use crate::config::Config;
use crate::mood::{Mood, classify_tone, next_mood};

pub fn render_status(config: &Config) -> String {
    let key_state = if config.has_api_key() {
        "configured"
    } else {
        "missing"
    };
    let persona = config.chat.persona.as_deref().unwrap_or("(none)");
    let typing = &config.chat.typing;

    let lines = [
        "◆ moodline status".to_string(),
        String::new(),
        format!("Version     {}", env!("CARGO_PKG_VERSION")),
        format!("Config      {}", config.config_path.display()),
        String::new(),
        format!("  Provider      {}", config.default_provider),
        format!("   Model         {}", config.default_model),
        format!("   Temperature   {:.2}", config.default_temperature),
        format!("   API key       {key_state}"),
        format!(
            "   Retries       {} (backoff {} ms)",
            config.reliability.provider_retries, config.reliability.provider_backoff_ms
        ),
        String::new(),
        format!("  Grouping      {}", config.chat.default_grouping),
        format!("   Busy chance   {:.2}", config.chat.busy_probability),
        format!("   Gen timeout   {}s", config.chat.generation_timeout_secs),
        format!("   Persona       {persona}"),
        format!(
            "   Typing        {} ({} ms/char, {} ms between bubbles)",
            if typing.enabled { "on" } else { "off" },
            typing.per_char_ms,
            typing.gap_ms
        ),
        String::new(),
        format!(
            "  Gateway       {}:{}",
            config.gateway.host, config.gateway.port
        ),
        format!("   Body limit    {} bytes", config.gateway.max_body_bytes),
    ];
    lines.join("\n")
}

/// Detected tone for `text` and the transition it would cause from `from`.
pub fn render_classification(text: &str, from: Mood) -> String {
    let desired = classify_tone(text, &[]);
    let transition = next_mood(from, desired);
    format!(
        "tone:       {desired}\ntransition: {from} -> {} (intensity {}, {})",
        transition.mood, transition.intensity, transition.rule
    )
}
