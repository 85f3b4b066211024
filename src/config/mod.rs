pub mod schema;

pub use schema::{ChatConfig, Config, GatewayConfig, ReliabilityConfig};
