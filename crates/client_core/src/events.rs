//! Notifications the session broadcasts to whatever is rendering it.

use shared::domain::Citation;

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    UploadFailed { file_name: String, message: String },
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::UploadFailed { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A turn landed at `index`; it is now the latest one and should be
    /// scrolled into view.
    TurnAppended { index: usize },
    PendingChanged(bool),
    UploadingChanged(bool),
    DocumentsRefreshed { count: usize },
    CitationSelected(Citation),
    CitationCleared,
    Notice(Notice),
}
