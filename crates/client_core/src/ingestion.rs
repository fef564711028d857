//! Uploading documents and keeping the registry in step with the backend.

use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    backend::{DocumentUpload, RagBackend},
    error::{ListingFailure, UploadFailure},
    events::{Notice, SessionEvent},
    lock,
    registry::DocumentRegistry,
};

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Uploaded; `refreshed` is false when the follow-up listing failed and
    /// the registry still shows the previous documents.
    Indexed { refreshed: bool },
    Failed(UploadFailure),
    Skipped,
}

/// Keeps `uploading` raised for as long as it lives.
struct UploadingFlag<'a> {
    registry: &'a Mutex<DocumentRegistry>,
    events: &'a broadcast::Sender<SessionEvent>,
}

impl<'a> UploadingFlag<'a> {
    fn raise(
        registry: &'a Mutex<DocumentRegistry>,
        events: &'a broadcast::Sender<SessionEvent>,
    ) -> Self {
        if lock(registry).begin_upload() {
            let _ = events.send(SessionEvent::UploadingChanged(true));
        }
        Self { registry, events }
    }
}

impl Drop for UploadingFlag<'_> {
    fn drop(&mut self) {
        if lock(self.registry).end_upload() {
            let _ = self.events.send(SessionEvent::UploadingChanged(false));
        }
    }
}

pub struct IngestionOrchestrator {
    session_id: Uuid,
    backend: Arc<dyn RagBackend>,
    registry: Arc<Mutex<DocumentRegistry>>,
    events: broadcast::Sender<SessionEvent>,
    upload_timeout: Duration,
    listing_timeout: Duration,
}

impl IngestionOrchestrator {
    pub fn new(
        session_id: Uuid,
        backend: Arc<dyn RagBackend>,
        registry: Arc<Mutex<DocumentRegistry>>,
        events: broadcast::Sender<SessionEvent>,
        upload_timeout: Duration,
        listing_timeout: Duration,
    ) -> Self {
        Self {
            session_id,
            backend,
            registry,
            events,
            upload_timeout,
            listing_timeout,
        }
    }

    pub async fn ingest(&self, upload: Option<DocumentUpload>) -> IngestOutcome {
        let Some(upload) = upload else {
            debug!(session_id = %self.session_id, "rag: ingest called without a document");
            return IngestOutcome::Skipped;
        };

        let _uploading = UploadingFlag::raise(&self.registry, &self.events);
        self.upload_and_refresh(upload).await
    }

    /// Like `ingest`, but reading the file counts as part of the upload.
    pub async fn ingest_path(&self, path: Option<&Path>) -> IngestOutcome {
        let Some(path) = path else {
            debug!(session_id = %self.session_id, "rag: ingest called without a document");
            return IngestOutcome::Skipped;
        };

        let _uploading = UploadingFlag::raise(&self.registry, &self.events);
        match DocumentUpload::from_path(path).await {
            Ok(upload) => self.upload_and_refresh(upload).await,
            Err(failure) => self.upload_failed(&path.display().to_string(), failure),
        }
    }

    /// Re-lists the backend's documents. A failed or timed-out listing keeps
    /// the previous registry and is only logged.
    pub async fn refresh(&self) -> bool {
        let listed = match tokio::time::timeout(self.listing_timeout, self.backend.list_documents())
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ListingFailure::Timeout(self.listing_timeout)),
        };

        match listed {
            Ok(documents) => {
                let count = documents.len();
                lock(&self.registry).replace(documents);
                let _ = self.events.send(SessionEvent::DocumentsRefreshed { count });
                debug!(session_id = %self.session_id, count, "rag: document registry refreshed");
                true
            }
            Err(err) => {
                warn!(
                    session_id = %self.session_id,
                    error = %err,
                    "rag: document listing failed; keeping previous registry"
                );
                false
            }
        }
    }

    async fn upload_and_refresh(&self, upload: DocumentUpload) -> IngestOutcome {
        let file_name = upload.file_name.clone();
        info!(
            session_id = %self.session_id,
            file_name = %file_name,
            size_bytes = upload.bytes.len(),
            "rag: uploading document"
        );

        let uploaded = match tokio::time::timeout(
            self.upload_timeout,
            self.backend.upload_document(upload),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(UploadFailure::Timeout(self.upload_timeout)),
        };
        if let Err(failure) = uploaded {
            return self.upload_failed(&file_name, failure);
        }

        let refreshed = self.refresh().await;
        info!(session_id = %self.session_id, file_name = %file_name, refreshed, "rag: document indexed");
        IngestOutcome::Indexed { refreshed }
    }

    fn upload_failed(&self, file_name: &str, failure: UploadFailure) -> IngestOutcome {
        warn!(
            session_id = %self.session_id,
            file_name = %file_name,
            error = %failure,
            "rag: upload failed"
        );
        let _ = self.events.send(SessionEvent::Notice(Notice::UploadFailed {
            file_name: file_name.to_string(),
            message: format!("Upload failed: {failure}"),
        }));
        IngestOutcome::Failed(failure)
    }
}

#[cfg(test)]
#[path = "tests/ingestion_tests.rs"]
mod tests;
