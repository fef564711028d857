//! View model of the documents available for retrieval.

use shared::domain::DocumentSummary;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRegistry {
    documents: Vec<DocumentSummary>,
    uploads_in_flight: usize,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a freshly listed set of documents as a whole.
    pub fn replace(&mut self, documents: Vec<DocumentSummary>) {
        self.documents = documents;
    }

    /// Returns true when this call raised the `uploading` flag.
    pub fn begin_upload(&mut self) -> bool {
        self.uploads_in_flight += 1;
        self.uploads_in_flight == 1
    }

    /// Returns true when this call lowered the `uploading` flag.
    pub fn end_upload(&mut self) -> bool {
        if self.uploads_in_flight == 0 {
            return false;
        }
        self.uploads_in_flight -= 1;
        self.uploads_in_flight == 0
    }

    pub fn documents(&self) -> &[DocumentSummary] {
        &self.documents
    }

    pub fn contains(&self, name: &str) -> bool {
        self.documents.iter().any(|doc| doc.name == name)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploads_in_flight > 0
    }
}
