use moodline::error::LlmError;
use moodline::llm::Provider;
use moodline::mood::RandomSource;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

/// What the scripted provider does on every call.
#[allow(dead_code)]
pub enum Script {
    Reply(&'static str),
    Quota,
    Hang,
}

pub struct ScriptedProvider {
    script: Script,
    pub inputs: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            inputs: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn chat_with_system<'a>(
        &'a self,
        _system_prompt: Option<&'a str>,
        message: &'a str,
        _model: &'a str,
        _temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.inputs.lock().unwrap().push(message.to_string());
            match self.script {
                Script::Reply(text) => Ok(text.to_string()),
                Script::Quota => Err(LlmError::QuotaExceeded {
                    provider: "scripted".into(),
                    message: "RESOURCE_EXHAUSTED".into(),
                }
                .into()),
                Script::Hang => {
                    tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        })
    }
}

/// Never triggers the busy filter; integer draws return `value` clamped to
/// the requested range.
pub struct NeverBusy {
    pub value: u32,
}

impl RandomSource for NeverBusy {
    fn next_f64(&self) -> f64 {
        0.999
    }

    fn range_inclusive(&self, low: u32, high: u32) -> u32 {
        self.value.clamp(low, high)
    }
}
