//! `RagBackend` over the backend's HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use shared::{
    domain::DocumentSummary,
    error::ApiError,
    protocol::{QueryRequest, QueryResponse, UPLOAD_FIELD},
};
use tracing::debug;

use crate::{
    backend::{DocumentUpload, RagBackend},
    error::{ListingFailure, QueryFailure, UploadFailure},
};

pub struct HttpRagBackend {
    http: Client,
    base_url: String,
    upload_timeout: Duration,
}

impl HttpRagBackend {
    pub fn new(base_url: impl Into<String>, upload_timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Splits a non-success response into its status code and `detail` text.
async fn rejection(response: Response) -> (u16, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        ApiError::from_body(&body).detail
    };
    (status.as_u16(), detail)
}

#[async_trait]
impl RagBackend for HttpRagBackend {
    async fn submit_query(&self, text: &str) -> Result<QueryResponse, QueryFailure> {
        let response = self
            .http
            .post(format!("{}/query", self.base_url))
            .json(&QueryRequest {
                query: text.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, detail) = rejection(response).await;
            return Err(QueryFailure::Status { status, detail });
        }

        let body = response.bytes().await?;
        let answer: QueryResponse = serde_json::from_slice(&body)
            .map_err(|e| QueryFailure::Malformed(e.to_string()))?;
        debug!(sources = answer.sources.len(), "rag: query answered");
        Ok(answer)
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<(), UploadFailure> {
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    UploadFailure::Timeout(self.upload_timeout)
                } else {
                    UploadFailure::from(err)
                }
            })?;

        if !response.status().is_success() {
            let (status, detail) = rejection(response).await;
            return Err(UploadFailure::Status { status, detail });
        }

        debug!(file_name = %upload.file_name, "rag: document uploaded");
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, ListingFailure> {
        let response = self
            .http
            .get(format!("{}/files", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, detail) = rejection(response).await;
            return Err(ListingFailure::Status { status, detail });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ListingFailure::Malformed(e.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/http_backend_tests.rs"]
mod tests;
