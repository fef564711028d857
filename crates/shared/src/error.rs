use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the RAG backend on non-success responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{detail}")]
pub struct ApiError {
    pub detail: String,
}

impl ApiError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Extracts `detail` from a response body, falling back to the raw text.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<ApiError>(body) {
            Ok(err) => err,
            Err(_) => Self::new(body.trim()),
        }
    }
}
