//! CLI for SpendSage — load an expense file, answer questions about it.
//!
//! One-shot mode answers a single query; with no query argument a
//! line-oriented interactive mode reads questions from stdin, reusing one
//! agent so follow-ups keep their conversation context.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use spendsage::agent::ExpenseAgent;
use spendsage::config::Config;
use spendsage::expense::ExpenseStore;
use spendsage::logging::init_logging;
use spendsage::providers;

#[derive(Parser)]
#[command(
    name = "spendsage",
    version,
    about = "Conversational expense analytics agent"
)]
struct Cli {
    /// Path to the expense records JSON file
    #[arg(short, long)]
    expenses: PathBuf,

    /// Question to answer; omit for interactive mode
    query: Option<String>,

    /// Config file path (defaults to ~/.spendsage/config.json)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// CLI entry point.
pub async fn run() -> Result<()> {
    // .env first so key lookups in config overrides see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
    .with_context(|| "Failed to load configuration")?;

    init_logging(&config.logging);

    let store = Arc::new(
        ExpenseStore::from_json_file(&cli.expenses)
            .with_context(|| format!("Failed to load expenses from {:?}", cli.expenses))?,
    );
    tracing::info!(records = store.len(), "Expense store loaded");

    let provider = providers::for_config(&config)
        .with_context(|| "Failed to construct reasoning provider")?;

    let mut agent = ExpenseAgent::from_config(provider, store, &config);

    match cli.query {
        Some(query) => {
            let answer = agent.run(&query).await?;
            println!("{}", answer);
        }
        None => interactive(&mut agent).await?,
    }

    Ok(())
}

/// Read questions line by line, answering with the same agent so the
/// conversation context carries across follow-ups.
async fn interactive(agent: &mut ExpenseAgent) -> Result<()> {
    println!("SpendSage — ask about your expenses (Ctrl-D to exit)");
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        match agent.run(query).await {
            Ok(answer) => println!("{}\n", answer),
            Err(e) => eprintln!("Error: {}\n", e),
        }
    }

    Ok(())
}
