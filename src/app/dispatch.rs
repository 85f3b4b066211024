use crate::app::session::ChatSession;
use crate::app::status::{render_classification, render_status};
use crate::chat::{DeliveryStep, PendingQueue, TurnOrchestrator, TypingPacing, plan_delivery};
use crate::cli::commands::{Cli, Commands};
use crate::config::Config;
use crate::mood::{ResponseGrouping, random_source};
use anyhow::{Context, Result};
use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Gateway { port, host } => {
            let port = port.unwrap_or(config.gateway.port);
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            if port == 0 {
                info!("Starting moodline gateway on {host} (random port)");
            } else {
                info!("Starting moodline gateway on {host}:{port}");
            }
            crate::gateway::run_gateway(&host, port, config).await
        }

        Commands::Chat {
            message,
            grouping,
            persona,
            seed,
        } => run_chat(&config, message, grouping, persona, seed).await,

        Commands::Classify { text, from } => {
            println!("{}", render_classification(&text, from));
            Ok(())
        }

        Commands::Status => {
            println!("{}", render_status(&config));
            Ok(())
        }
    }
}

/// One line of terminal input.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput {
    Quit,
    Blank,
    Message(String),
}

fn read_input(line: &str) -> ReplInput {
    match line.trim() {
        "" => ReplInput::Blank,
        "/quit" | "/exit" => ReplInput::Quit,
        text => ReplInput::Message(text.to_string()),
    }
}

async fn run_chat(
    config: &Config,
    message: Option<String>,
    grouping: Option<ResponseGrouping>,
    persona: Option<String>,
    seed: Option<u64>,
) -> Result<()> {
    let random = random_source(seed.or(config.chat.seed));
    let orchestrator = TurnOrchestrator::from_config(config, random)?;
    let persona = persona.or_else(|| config.chat.persona.clone());
    let mut session = ChatSession::new(Arc::new(orchestrator), grouping, persona);
    let pacing = config.chat.typing;

    if let Some(message) = message {
        return chat_turn(&mut session, &message, &pacing).await;
    }

    println!("◆ moodline chat (Ctrl+D or /quit to exit)\n");

    // Stdin is read on its own task so lines typed while a reply is playing
    // are queued and sent together as the next turn.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut queue = PendingQueue::new();
    let mut input_open = true;
    let mut quit = false;
    while !quit {
        print!("> ");
        std::io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = rx.recv().await else {
            break;
        };
        let message = match read_input(&line) {
            ReplInput::Quit => break,
            ReplInput::Blank => continue,
            ReplInput::Message(message) => message,
        };
        let Some(mut next) = queue.submit(message) else {
            continue;
        };

        loop {
            let outcome = {
                let turn = chat_turn(&mut session, &next, &pacing);
                tokio::pin!(turn);
                loop {
                    tokio::select! {
                        result = &mut turn => break result,
                        line = rx.recv(), if input_open => match line.as_deref().map(read_input) {
                            Some(ReplInput::Message(message)) => {
                                let _ = queue.submit(message);
                            }
                            Some(ReplInput::Quit) => quit = true,
                            Some(ReplInput::Blank) => {}
                            None => input_open = false,
                        },
                    }
                }
            };
            outcome?;

            if quit {
                break;
            }
            match queue.complete() {
                Some(coalesced) => {
                    info!(chars = coalesced.chars().count(), "Sending messages queued during the turn");
                    next = coalesced;
                }
                None => break,
            }
        }
    }

    if let Some(state) = session.state() {
        info!(
            mood = %state.current_mood,
            intensity = state.mood_intensity,
            "Chat session ended"
        );
    }
    Ok(())
}

async fn chat_turn(session: &mut ChatSession, message: &str, pacing: &TypingPacing) -> Result<()> {
    let response = session.send(message).await?;

    for step in plan_delivery(&response.messages, pacing) {
        match step {
            DeliveryStep::Show {
                text,
                typing,
                gap_after,
            } => {
                tokio::time::sleep(typing).await;
                println!("  {text}");
                tokio::time::sleep(gap_after).await;
            }
            DeliveryStep::CancelTyping { number, typing } => {
                tracing::debug!(number, "Typing without a reply");
                tokio::time::sleep(typing).await;
            }
        }
    }

    if let Some(mood) = response.mood_info {
        info!(
            from = %mood.previous_mood,
            to = %mood.current_mood,
            intensity = mood.intensity,
            "Mood after turn"
        );
    }
    Ok(())
}
