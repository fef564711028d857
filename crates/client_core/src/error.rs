use std::time::Duration;

use shared::domain::CitationId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryFailure {
    #[error("query transport error: {0}")]
    Transport(String),
    #[error("backend rejected query ({status}): {detail}")]
    Status { status: u16, detail: String },
    #[error("malformed query response: {0}")]
    Malformed(String),
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
    #[error("query aborted before the backend answered")]
    Aborted,
    #[error("rag backend is unavailable")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadFailure {
    #[error("upload transport error: {0}")]
    Transport(String),
    #[error("backend rejected upload ({status}): {detail}")]
    Status { status: u16, detail: String },
    #[error("unsupported document type '{0}'; expected one of pdf, docx, png, jpg, jpeg")]
    UnsupportedType(String),
    #[error("failed to read document: {0}")]
    Io(String),
    #[error("upload timed out after {0:?}")]
    Timeout(Duration),
    #[error("rag backend is unavailable")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingFailure {
    #[error("listing transport error: {0}")]
    Transport(String),
    #[error("backend rejected listing ({status}): {detail}")]
    Status { status: u16, detail: String },
    #[error("malformed listing response: {0}")]
    Malformed(String),
    #[error("listing timed out after {0:?}")]
    Timeout(Duration),
    #[error("rag backend is unavailable")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("no turn at index {0}")]
    NoSuchTurn(usize),
    #[error("turn {turn} has no source #{id}")]
    NoSuchCitation { turn: usize, id: CitationId },
}

impl From<reqwest::Error> for QueryFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<reqwest::Error> for UploadFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for ListingFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
