pub mod dispatch;
mod session;
pub mod status;

pub use dispatch::dispatch;
pub use session::ChatSession;
