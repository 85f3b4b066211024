mod chat;
mod core;
mod gateway;

pub use chat::ChatConfig;
pub use self::core::{Config, ReliabilityConfig};
pub use gateway::GatewayConfig;
