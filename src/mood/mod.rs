pub mod filter;
pub mod grouping;
pub mod random;
pub mod segment;
pub mod state;
pub mod table;
pub mod tone;
pub mod transition;

pub use filter::{FilterReason, FilterVerdict, MessageFilter};
pub use grouping::ResponseGrouping;
pub use random::{RandomSource, SeededRandom, ThreadRandom, random_source};
pub use segment::{Segmenter, SplitStrategy};
pub use state::{ConversationContext, MoodState, RecentMessage, Sender};
pub use table::Mood;
pub use tone::classify_tone;
pub use transition::{MoodTransition, TransitionRule, next_mood};
