pub mod delivery;
pub mod transcript;
pub mod turn;

pub use delivery::{DeliveryStep, PendingQueue, TypingPacing, parse_cancel_typing, plan_delivery};
pub use transcript::{HistoryMessage, render_generation_input};
pub use turn::{
    MoodInfo, OutboundMessage, TurnOrchestrator, TurnPhase, TurnRequest, TurnResponse,
    TurnSettings,
};
