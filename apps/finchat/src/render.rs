//! Plain-text rendering of session state for the terminal.

use client_core::DocumentRegistry;
use shared::domain::{Citation, Role, Turn};

pub fn render_turn(index: usize, turn: &Turn) -> String {
    let speaker = match turn.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    let mut out = format!("[{index}] {speaker}> {}", turn.content);

    if !turn.sources.is_empty() {
        let sources: Vec<String> = turn
            .sources
            .iter()
            .map(|source| format!("{} ({})", source.label(), source.score_label()))
            .collect();
        out.push_str("\n    verified context: ");
        out.push_str(&sources.join("  "));
        out.push_str(&format!("\n    (/open {index} <id> to inspect a source)"));
    }
    out
}

pub fn render_citation(citation: &Citation) -> String {
    let rule = "-".repeat(60);
    format!(
        "{rule}\n{}\nCitation Reference #{}\n\n{}\n\nMatch Score: {}\n{rule}\n(/close to dismiss)",
        citation.filename(),
        citation.id,
        citation.content,
        citation.score_label(),
    )
}

pub fn render_documents(registry: &DocumentRegistry) -> String {
    let mut out = format!("Knowledge Base ({})", registry.len());
    if registry.is_empty() {
        out.push_str("\n  Connect data sources to begin");
    }
    for document in registry.documents() {
        out.push_str("\n  - ");
        out.push_str(&document.name);
    }
    if registry.is_uploading() {
        out.push_str("\n  (analyzing upload...)");
    }
    out
}
