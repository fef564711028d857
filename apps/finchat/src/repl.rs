//! Interactive chat loop: reads lines, drives the session, and renders
//! whatever the session broadcasts.

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use client_core::{
    ClearReason, IngestOutcome, RagSession, RejectReason, SessionEvent, SubmitOutcome,
};
use shared::domain::CitationId;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::render::{render_citation, render_documents, render_turn};

const HELP: &str = "\
Type a question to query the knowledge base.
  /upload <path>     ingest a document (pdf, docx, png, jpg, jpeg)
  /files             list ingested documents
  /open <turn> <id>  inspect source <id> of answer <turn>
  /close             dismiss the open source
  /help              show this help
  /quit              leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ask(String),
    Upload(PathBuf),
    Files,
    Open { turn: usize, id: CitationId },
    Close,
    Help,
    Quit,
    Invalid(String),
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Self::Ask(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match parts.next().unwrap_or_default() {
            "upload" => {
                let path = command
                    .trim_start()
                    .strip_prefix("upload")
                    .unwrap_or_default()
                    .trim();
                if path.is_empty() {
                    Self::Invalid("usage: /upload <path>".to_string())
                } else {
                    Self::Upload(PathBuf::from(path))
                }
            }
            "files" => Self::Files,
            "open" => {
                let turn = parts.next().and_then(|v| v.parse::<usize>().ok());
                let id = parts.next().and_then(|v| v.parse::<i64>().ok());
                match (turn, id) {
                    (Some(turn), Some(id)) => Self::Open {
                        turn,
                        id: CitationId(id),
                    },
                    _ => Self::Invalid("usage: /open <turn> <id>".to_string()),
                }
            }
            "close" => Self::Close,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => Self::Invalid(format!("unknown command '/{other}'; try /help")),
        }
    }
}

/// Prints turns as they land (always the latest one), plus pending and
/// upload indicators, notices and the open citation.
pub fn spawn_renderer(session: Arc<RagSession>) -> JoinHandle<()> {
    let mut events = session.subscribe_events();
    tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "renderer fell behind session events");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            match event {
                SessionEvent::TurnAppended { index } => {
                    if let Some(turn) = session.conversation().turn(index) {
                        println!("{}", render_turn(index, turn));
                    }
                }
                SessionEvent::PendingChanged(true) => println!("... assembling answer"),
                SessionEvent::PendingChanged(false) => {}
                SessionEvent::UploadingChanged(true) => println!("... analyzing upload"),
                SessionEvent::UploadingChanged(false) => {}
                SessionEvent::DocumentsRefreshed { .. } => {
                    println!("{}", render_documents(&session.documents()));
                }
                SessionEvent::CitationSelected(citation) => {
                    println!("{}", render_citation(&citation));
                }
                SessionEvent::CitationCleared => println!("(source closed)"),
                SessionEvent::Notice(notice) => eprintln!("! {}", notice.message()),
            }
        }
    })
}

pub async fn run(session: Arc<RagSession>) -> Result<()> {
    let renderer = spawn_renderer(Arc::clone(&session));
    session.refresh_documents().await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match ChatCommand::parse(&line) {
            ChatCommand::Ask(query) => {
                if query.trim().is_empty() {
                    continue;
                }
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    let outcome = session.submit(&query).await;
                    if outcome == SubmitOutcome::Rejected(RejectReason::Busy) {
                        eprintln!("! still waiting for the previous answer");
                    }
                });
            }
            ChatCommand::Upload(path) => {
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    if let IngestOutcome::Indexed { refreshed: false } =
                        session.ingest_path(&path).await
                    {
                        eprintln!("! uploaded, but the document list could not be refreshed");
                    }
                });
            }
            ChatCommand::Files => println!("{}", render_documents(&session.documents())),
            ChatCommand::Open { turn, id } => {
                if let Err(err) = session.select_source(turn, id) {
                    eprintln!("! {err}");
                }
            }
            ChatCommand::Close => session.clear_selection(ClearReason::Dismiss),
            ChatCommand::Help => println!("{HELP}"),
            ChatCommand::Quit => break,
            ChatCommand::Invalid(message) => eprintln!("! {message}"),
        }
    }

    session.clear_selection(ClearReason::Navigation);
    debug!("chat loop finished");
    renderer.abort();
    Ok(())
}
