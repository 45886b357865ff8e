use crate::{Document, ServiceError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Why a conversion produced no PDF.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionFailure {
    /// The engine did not answer within the configured bound.
    #[error("conversion timed out")]
    Timeout,

    /// The engine answered with a non-success status or could not be talked to.
    #[error("conversion engine error")]
    EngineError,
}

/// Turns a source document into PDF bytes. All or nothing: there are no
/// partial results.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, document: &Document) -> Result<Bytes, ConversionFailure>;
}

// ── GotenbergClient ──────────────────────────────────────────────────────────

/// Client for a LibreOffice-compatible conversion route
/// (`/forms/libreoffice/convert`).
///
/// The document travels as multipart field `files` with its original filename,
/// which the engine uses to pick the import filter. No retries.
#[derive(Debug, Clone)]
pub struct GotenbergClient {
    client: reqwest::Client,
    url: String,
}

impl GotenbergClient {
    /// Build a client whose requests, body included, are bounded by `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Converter for GotenbergClient {
    async fn convert(&self, document: &Document) -> Result<Bytes, ConversionFailure> {
        let part = Part::stream(Body::from(document.data().clone()))
            .file_name(document.filename().to_string());
        let form = Form::new().part("files", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_failure(&self.url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, filename = document.filename(), "conversion engine error");
            return Err(ConversionFailure::EngineError);
        }

        let pdf = response
            .bytes()
            .await
            .map_err(|e| transport_failure(&self.url, e))?;

        tracing::debug!(filename = document.filename(), bytes = pdf.len(), "conversion finished");
        Ok(pdf)
    }
}

fn transport_failure(url: &str, e: reqwest::Error) -> ConversionFailure {
    if e.is_timeout() {
        tracing::warn!(url, "conversion timed out");
        ConversionFailure::Timeout
    } else {
        tracing::error!(url, error = %e, "conversion engine unreachable");
        ConversionFailure::EngineError
    }
}
