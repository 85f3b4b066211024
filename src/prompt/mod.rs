mod builder;
mod engine;

pub use builder::PromptSynthesizer;
pub use engine::TeraEngine;
