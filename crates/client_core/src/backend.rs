use std::path::Path;

use async_trait::async_trait;
use shared::{domain::DocumentSummary, protocol::QueryResponse};

use crate::error::{ListingFailure, QueryFailure, UploadFailure};

/// File extensions the ingestion pipeline can extract text from.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "docx", "png", "jpg", "jpeg"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, UploadFailure> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| UploadFailure::Io(format!("invalid file name: {}", path.display())))?
            .to_string();
        ensure_accepted(&file_name)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| UploadFailure::Io(format!("{}: {e}", path.display())))?;
        Ok(Self::new(file_name, bytes))
    }
}

pub fn ensure_accepted(file_name: &str) -> Result<(), UploadFailure> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(UploadFailure::UnsupportedType(file_name.to_string()))
    }
}

#[async_trait]
pub trait RagBackend: Send + Sync {
    async fn submit_query(&self, text: &str) -> Result<QueryResponse, QueryFailure>;
    async fn upload_document(&self, upload: DocumentUpload) -> Result<(), UploadFailure>;
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, ListingFailure>;
}

/// Stand-in used when no backend is configured; every call fails.
pub struct UnavailableBackend;

#[async_trait]
impl RagBackend for UnavailableBackend {
    async fn submit_query(&self, _text: &str) -> Result<QueryResponse, QueryFailure> {
        Err(QueryFailure::Unavailable)
    }

    async fn upload_document(&self, _upload: DocumentUpload) -> Result<(), UploadFailure> {
        Err(UploadFailure::Unavailable)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, ListingFailure> {
        Err(ListingFailure::Unavailable)
    }
}
