use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod backend;
pub mod citations;
pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod http_backend;
pub mod ingestion;
pub mod query;
pub mod registry;
mod session;

pub use backend::{DocumentUpload, RagBackend, UnavailableBackend, ACCEPTED_EXTENSIONS};
pub use citations::{CitationStore, ClearReason};
pub use config::{load_settings, ClientSettings};
pub use conversation::{ConversationLog, RejectReason};
pub use error::{ListingFailure, QueryFailure, SelectError, UploadFailure};
pub use events::{Notice, SessionEvent};
pub use http_backend::HttpRagBackend;
pub use ingestion::{IngestOutcome, IngestionOrchestrator};
pub use query::{QueryOrchestrator, SubmitOutcome};
pub use registry::DocumentRegistry;
pub use session::RagSession;

/// Store locks are never held across an await; a poisoned store is still usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
