use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use shared::domain::{Citation, CitationId};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    backend::{DocumentUpload, RagBackend, UnavailableBackend},
    citations::{CitationStore, ClearReason},
    config::ClientSettings,
    conversation::ConversationLog,
    error::SelectError,
    events::SessionEvent,
    http_backend::HttpRagBackend,
    ingestion::{IngestOutcome, IngestionOrchestrator},
    lock,
    query::{QueryOrchestrator, SubmitOutcome},
    registry::DocumentRegistry,
};

/// One conversation with the assistant: the transcript, the document
/// registry and the open citation, plus the operations that change them.
pub struct RagSession {
    session_id: Uuid,
    conversation: Arc<Mutex<ConversationLog>>,
    registry: Arc<Mutex<DocumentRegistry>>,
    citations: Mutex<CitationStore>,
    queries: QueryOrchestrator,
    ingestion: IngestionOrchestrator,
    events: broadcast::Sender<SessionEvent>,
}

impl RagSession {
    pub fn new(backend: Arc<dyn RagBackend>, settings: &ClientSettings) -> Arc<Self> {
        let session_id = Uuid::new_v4();
        let (events, _) = broadcast::channel(settings.event_capacity.max(1));
        let conversation = Arc::new(Mutex::new(ConversationLog::new()));
        let registry = Arc::new(Mutex::new(DocumentRegistry::new()));

        Arc::new(Self {
            session_id,
            queries: QueryOrchestrator::new(
                session_id,
                Arc::clone(&backend),
                Arc::clone(&conversation),
                events.clone(),
                settings.query_timeout(),
            ),
            ingestion: IngestionOrchestrator::new(
                session_id,
                backend,
                Arc::clone(&registry),
                events.clone(),
                settings.upload_timeout(),
                settings.listing_timeout(),
            ),
            conversation,
            registry,
            citations: Mutex::new(CitationStore::new()),
            events,
        })
    }

    /// Builds the HTTP backend from `settings`, or a backend that fails every
    /// call when no URL is configured.
    pub fn from_settings(settings: &ClientSettings) -> Arc<Self> {
        let backend: Arc<dyn RagBackend> = match &settings.backend_url {
            Some(url) => Arc::new(HttpRagBackend::new(url.clone(), settings.upload_timeout())),
            None => {
                warn!("no rag backend url configured; queries and uploads will fail");
                Arc::new(UnavailableBackend)
            }
        };
        let session = Self::new(backend, settings);
        info!(session_id = %session.session_id, backend_url = ?settings.backend_url, "rag: session started");
        session
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub async fn submit(&self, query: &str) -> SubmitOutcome {
        self.queries.submit(query).await
    }

    pub async fn ingest(&self, upload: Option<DocumentUpload>) -> IngestOutcome {
        self.ingestion.ingest(upload).await
    }

    pub async fn ingest_path(&self, path: &Path) -> IngestOutcome {
        self.ingestion.ingest_path(Some(path)).await
    }

    pub async fn refresh_documents(&self) -> bool {
        self.ingestion.refresh().await
    }

    pub fn select(&self, citation: Citation) {
        debug!(session_id = %self.session_id, citation = %citation.label(), "rag: citation opened");
        lock(&self.citations).select(citation.clone());
        let _ = self.events.send(SessionEvent::CitationSelected(citation));
    }

    /// Opens source `id` of the turn at `turn_index`. The citation is copied,
    /// so later turns never disturb what is being inspected.
    pub fn select_source(&self, turn_index: usize, id: CitationId) -> Result<Citation, SelectError> {
        let citation = {
            let conversation = lock(&self.conversation);
            let turn = conversation
                .turn(turn_index)
                .ok_or(SelectError::NoSuchTurn(turn_index))?;
            turn.source(id)
                .cloned()
                .ok_or(SelectError::NoSuchCitation {
                    turn: turn_index,
                    id,
                })?
        };
        self.select(citation.clone());
        Ok(citation)
    }

    pub fn clear_selection(&self, reason: ClearReason) {
        if lock(&self.citations).clear() {
            debug!(session_id = %self.session_id, reason = reason.as_str(), "rag: citation closed");
            let _ = self.events.send(SessionEvent::CitationCleared);
        }
    }

    pub fn conversation(&self) -> ConversationLog {
        lock(&self.conversation).clone()
    }

    pub fn documents(&self) -> DocumentRegistry {
        lock(&self.registry).clone()
    }

    pub fn selection(&self) -> Option<Citation> {
        lock(&self.citations).selected().cloned()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
