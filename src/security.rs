//! Malware scanning gate in front of the conversion engine.
//!
//! Every failure mode of the scan (unreachable service, timeout, unreadable
//! reply) is reported as [`ScanVerdict::Unavailable`], never as clean.

use crate::{Document, ServiceError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Result of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanVerdict {
    Clean,
    Infected,
    Unavailable,
}

/// A capability that decides whether a document is safe to convert.
#[async_trait]
pub trait SecurityGate: Send + Sync {
    async fn verify(&self, document: &Document) -> ScanVerdict;
}

// ── HttpSecurityGate ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ScanReply {
    status: String,
}

/// Gate backed by the external AV service.
///
/// Sends the document as multipart field `file` and expects a JSON reply of
/// the form `{"status": "clean"}`.
#[derive(Debug, Clone)]
pub struct HttpSecurityGate {
    client: reqwest::Client,
    url: String,
}

impl HttpSecurityGate {
    /// Build a gate whose single round trip is bounded by `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, url))
    }

    /// Build a gate on top of an existing client (its timeout applies).
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
impl SecurityGate for HttpSecurityGate {
    async fn verify(&self, document: &Document) -> ScanVerdict {
        let part = Part::stream(Body::from(document.data().clone()))
            .file_name(document.filename().to_string());
        let form = Form::new().part("file", part);

        let response = match self.client.post(&self.url).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url = %self.url, error = %e, timeout = e.is_timeout(), "AV service unreachable");
                return ScanVerdict::Unavailable;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(%status, filename = document.filename(), "AV service rejected document");
            return ScanVerdict::Infected;
        }

        match response.json::<ScanReply>().await {
            Ok(reply) if reply.status == "clean" => ScanVerdict::Clean,
            Ok(reply) => {
                tracing::warn!(status = %reply.status, filename = document.filename(), "AV service flagged document");
                ScanVerdict::Infected
            }
            Err(e) => {
                tracing::error!(url = %self.url, error = %e, "AV service reply unreadable");
                ScanVerdict::Unavailable
            }
        }
    }
}

// ── StaticSecurityGate ───────────────────────────────────────────────────────

/// Deterministic gate that returns the same verdict for every document.
///
/// Counts how often it was consulted so callers can assert on it.
#[derive(Debug)]
pub struct StaticSecurityGate {
    verdict: ScanVerdict,
    calls: AtomicUsize,
}

impl StaticSecurityGate {
    pub fn new(verdict: ScanVerdict) -> Self {
        Self {
            verdict,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn clean() -> Self {
        Self::new(ScanVerdict::Clean)
    }

    pub fn infected() -> Self {
        Self::new(ScanVerdict::Infected)
    }

    pub fn unavailable() -> Self {
        Self::new(ScanVerdict::Unavailable)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecurityGate for StaticSecurityGate {
    async fn verify(&self, _document: &Document) -> ScanVerdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict
    }
}
