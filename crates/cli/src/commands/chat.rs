//! `reelchat chat`: interactive or single-message chat mode.

use reelchat_agent::{DialogueGraph, DialogueSettings, graph};
use reelchat_config::AppConfig;
use reelchat_core::state::ConversationState;
use reelchat_knowledge::{ReviewIndex, SubjectTable};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::info;

/// Load the knowledge sources and install the process-wide graph.
/// Any failure here aborts startup.
fn build_graph(config: &AppConfig) -> Result<Arc<DialogueGraph>, Box<dyn std::error::Error>> {
    let subjects = SubjectTable::load(&config.knowledge.subjects_path)
        .map_err(|e| format!("Failed to load subjects: {e}"))?;
    let reviews = ReviewIndex::load(&config.retrieval.reviews_path)
        .map_err(|e| format!("Failed to load reviews: {e}"))?;
    info!(
        subjects = subjects.len(),
        reviews = reviews.len(),
        "Knowledge sources loaded"
    );

    let router = reelchat_providers::build_from_config(config);
    let provider = router.default().ok_or("No default provider configured")?;

    let settings = DialogueSettings::from_config(config);
    let dialogue = DialogueGraph::standard(
        provider,
        Arc::new(reviews),
        Arc::new(subjects),
        &settings,
    )?;

    Ok(graph::init(dialogue)?)
}

fn is_exit(line: &str) -> bool {
    matches!(line, "exit" | "quit" | ":q")
}

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    REELCHAT_API_KEY, OPENAI_API_KEY, UPSTAGE_API_KEY");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let graph = build_graph(&config)?;
    let mut state = ConversationState::new();

    if let Some(msg) = message {
        graph.run_turn(&mut state, &msg).await?;
        println!("{}", state.output);
        return Ok(());
    }

    println!();
    println!("  ReelChat: interactive mode");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", reelchat_providers::model_for(&config));
    println!("  Session:   {}", state.id);
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit', 'quit' or ':q' to leave.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }

        match graph.run_turn(&mut state, line).await {
            Ok(()) => {
                println!();
                for reply_line in state.output.lines() {
                    println!("  ReelChat > {reply_line}");
                }
                println!();
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
