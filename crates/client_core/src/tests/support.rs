//! Scripted `RagBackend` shared by the orchestrator and session tests.

use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::{Citation, CitationId, CitationMetadata, DocumentSummary},
    protocol::QueryResponse,
};
use tokio::sync::{broadcast, Mutex, Notify};

use crate::{
    backend::{DocumentUpload, RagBackend},
    error::{ListingFailure, QueryFailure, UploadFailure},
    events::SessionEvent,
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Answer,
    Fail,
    Hang,
    Panic,
}

pub struct ScriptedBackend {
    pub query_mode: QueryMode,
    pub answer: QueryResponse,
    pub query_failure: QueryFailure,
    pub upload_failure: Option<UploadFailure>,
    pub listing_failure: Option<ListingFailure>,
    /// Uploads and listings that never resolve.
    pub upload_hangs: bool,
    pub listing_hangs: bool,
    pub documents: Arc<Mutex<Vec<DocumentSummary>>>,
    pub queries: Arc<Mutex<Vec<String>>>,
    pub uploads: Arc<Mutex<Vec<DocumentUpload>>>,
    /// When set, queries and uploads wait for a `notify_one` before resolving.
    pub gate: Option<Arc<Notify>>,
}

pub fn q3_citation() -> Citation {
    Citation {
        id: CitationId(1),
        content: "Q3 revenue totalled $4.2M.".to_string(),
        score: 0.91,
        metadata: CitationMetadata::for_file("q3.pdf"),
    }
}

impl ScriptedBackend {
    pub fn answering() -> Self {
        Self {
            query_mode: QueryMode::Answer,
            answer: QueryResponse {
                answer: "Revenue was $4.2M".to_string(),
                sources: vec![q3_citation()],
            },
            query_failure: QueryFailure::Transport("connection refused".to_string()),
            upload_failure: None,
            listing_failure: None,
            upload_hangs: false,
            listing_hangs: false,
            documents: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
            uploads: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    pub fn failing(failure: QueryFailure) -> Self {
        let mut backend = Self::answering();
        backend.query_mode = QueryMode::Fail;
        backend.query_failure = failure;
        backend
    }

    pub fn with_mode(mut self, mode: QueryMode) -> Self {
        self.query_mode = mode;
        self
    }

    pub fn with_answer(mut self, answer: &str, sources: Vec<Citation>) -> Self {
        self.answer = QueryResponse {
            answer: answer.to_string(),
            sources,
        };
        self
    }

    pub fn with_upload_failure(mut self, failure: UploadFailure) -> Self {
        self.upload_failure = Some(failure);
        self
    }

    pub fn with_listing_failure(mut self, failure: ListingFailure) -> Self {
        self.listing_failure = Some(failure);
        self
    }

    pub fn with_hanging_upload(mut self) -> Self {
        self.upload_hangs = true;
        self
    }

    pub fn with_hanging_listing(mut self) -> Self {
        self.listing_hangs = true;
        self
    }

    pub fn with_documents(mut self, names: &[&str]) -> Self {
        let documents = names
            .iter()
            .map(|name| DocumentSummary {
                name: name.to_string(),
                path: Some(format!("docs/{name}")),
            })
            .collect();
        self.documents = Arc::new(Mutex::new(documents));
        self
    }

    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl RagBackend for ScriptedBackend {
    async fn submit_query(&self, text: &str) -> Result<QueryResponse, QueryFailure> {
        self.queries.lock().await.push(text.to_string());
        self.wait_for_gate().await;

        match self.query_mode {
            QueryMode::Answer => Ok(self.answer.clone()),
            QueryMode::Fail => Err(self.query_failure.clone()),
            QueryMode::Hang => std::future::pending().await,
            QueryMode::Panic => panic!("backend exploded mid-query"),
        }
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<(), UploadFailure> {
        self.wait_for_gate().await;
        if self.upload_hangs {
            std::future::pending::<()>().await;
        }
        if let Some(failure) = &self.upload_failure {
            return Err(failure.clone());
        }

        self.documents.lock().await.push(DocumentSummary {
            name: upload.file_name.clone(),
            path: Some(format!("docs/{}", upload.file_name)),
        });
        self.uploads.lock().await.push(upload);
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, ListingFailure> {
        if self.listing_hangs {
            std::future::pending::<()>().await;
        }
        if let Some(failure) = &self.listing_failure {
            return Err(failure.clone());
        }
        Ok(self.documents.lock().await.clone())
    }
}

/// Receives events until `want` shows up, returning everything seen.
pub async fn recv_until(
    rx: &mut broadcast::Receiver<SessionEvent>,
    want: &SessionEvent,
) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    loop {
        let event = rx.recv().await.expect("event channel open");
        let done = &event == want;
        seen.push(event);
        if done {
            return seen;
        }
    }
}

/// Everything already queued on `rx`, without waiting.
pub fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        seen.push(event);
    }
    seen
}
