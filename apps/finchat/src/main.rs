mod render;
mod repl;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, IngestOutcome, RagSession, SubmitOutcome};
use tracing_subscriber::EnvFilter;

use crate::render::{render_documents, render_turn};

#[derive(Parser, Debug)]
#[command(name = "finchat", about = "Chat with a financial document knowledge base")]
struct Cli {
    /// Backend base URL; overrides the settings file and FINCHAT_BACKEND_URL.
    #[arg(long, global = true)]
    backend_url: Option<String>,
    /// Settings file (defaults to ./finchat.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat session.
    Chat,
    /// Ask a single question and print the answer with its sources.
    Ask {
        query: String,
        /// Print the answer turn as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Ingest one document, then print the knowledge base.
    Upload { path: PathBuf },
    /// Print the knowledge base.
    Files,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.backend_url.as_deref() {
        settings = settings.with_backend_url(url)?;
    }
    let session = RagSession::from_settings(&settings);

    match cli.command {
        Command::Chat => repl::run(session).await,
        Command::Ask { query, json } => ask(&session, &query, json).await,
        Command::Upload { path } => upload(&session, path).await,
        Command::Files => {
            if !session.refresh_documents().await {
                bail!("could not list documents from the backend");
            }
            println!("{}", render_documents(&session.documents()));
            Ok(())
        }
    }
}

async fn ask(session: &Arc<RagSession>, query: &str, json: bool) -> Result<()> {
    let outcome = session.submit(query).await;
    let turn_index = match outcome {
        SubmitOutcome::Answered { turn_index, .. } => turn_index,
        SubmitOutcome::Failed {
            turn_index,
            failure,
        } => {
            eprintln!("! {failure}");
            turn_index
        }
        SubmitOutcome::Rejected(reason) => bail!("query not submitted: {reason:?}"),
    };

    let conversation = session.conversation();
    let Some(turn) = conversation.turn(turn_index) else {
        bail!("answer turn {turn_index} missing from the conversation");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(turn)?);
    } else {
        println!("{}", render_turn(turn_index, turn));
        for source in &turn.sources {
            println!("\n{}", render::render_citation(source));
        }
    }
    Ok(())
}

async fn upload(session: &Arc<RagSession>, path: PathBuf) -> Result<()> {
    match session.ingest_path(&path).await {
        IngestOutcome::Indexed { refreshed } => {
            if !refreshed {
                eprintln!("! uploaded, but the document list could not be refreshed");
            }
            println!("{}", render_documents(&session.documents()));
            Ok(())
        }
        IngestOutcome::Failed(failure) => bail!("Upload failed: {failure}"),
        IngestOutcome::Skipped => Ok(()),
    }
}
