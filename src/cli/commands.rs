use crate::mood::{Mood, ResponseGrouping};
use clap::{Parser, Subcommand};

/// `moodline` - mood-adaptive conversational chat backend built in Rust.
#[derive(Parser, Debug)]
#[command(name = "moodline")]
#[command(version)]
#[command(about = "A chat companion whose mood follows the conversation.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway (POST /api/chat)
    Gateway {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Chat from the terminal
    Chat {
        /// Single message mode (don't enter interactive mode)
        #[arg(short, long)]
        message: Option<String>,

        /// Bubble grouping (human-like, single, two-max)
        #[arg(short, long)]
        grouping: Option<ResponseGrouping>,

        /// Extra persona behavior appended to the system prompt
        #[arg(long)]
        persona: Option<String>,

        /// Fixed RNG seed for reproducible busy replies
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the tone detected for a message and the resulting transition
    Classify {
        /// Message text
        text: String,

        /// Mood to transition from
        #[arg(long, default_value = "friendly")]
        from: Mood,
    },

    /// Show resolved configuration
    Status,
}
