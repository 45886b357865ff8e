use crate::audit::{AuditRecord, AuditSink};
use crate::conversion::Converter;
use crate::security::{ScanVerdict, SecurityGate};
use crate::{Document, FidelityReport, FidelityStatus, FontFidelityAnalyzer, PipelineError};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

/// Pipeline stages a request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Scanning,
    Converting,
    Analyzing,
    Completed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Scanning => "scanning",
            Stage::Converting => "converting",
            Stage::Analyzing => "analyzing",
            Stage::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// A successfully converted document.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    pub pdf: Bytes,
    pub report: FidelityReport,
}

impl ConvertedDocument {
    pub fn fidelity_status(&self) -> FidelityStatus {
        self.report.status()
    }
}

// ── Orchestrator ─────────────────────────────────────────────────────────────

/// Runs scan → convert → analyze for one document at a time.
///
/// Holds no per-request state, so a single instance behind an [`Arc`] serves
/// any number of concurrent requests.
pub struct Orchestrator {
    gate: Arc<dyn SecurityGate>,
    converter: Arc<dyn Converter>,
    analyzer: FontFidelityAnalyzer,
    audit: Arc<dyn AuditSink>,
}

impl Orchestrator {
    pub fn new(
        gate: Arc<dyn SecurityGate>,
        converter: Arc<dyn Converter>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            gate,
            converter,
            analyzer: FontFidelityAnalyzer::new(),
            audit,
        }
    }

    /// Replace the default analyzer.
    pub fn with_analyzer(mut self, analyzer: FontFidelityAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Process one document.
    ///
    /// Rejected documents never reach the converter. The fidelity analysis
    /// cannot fail the request; exactly one audit record is written when the
    /// request completes, none otherwise.
    pub async fn process(&self, document: Document) -> Result<ConvertedDocument, PipelineError> {
        let span = tracing::info_span!("pipeline", filename = %document.filename(), bytes = document.len());
        self.run(document).instrument(span).await
    }

    async fn run(&self, document: Document) -> Result<ConvertedDocument, PipelineError> {
        transition(Stage::Received);

        transition(Stage::Scanning);
        match self.gate.verify(&document).await {
            ScanVerdict::Clean => {}
            ScanVerdict::Infected => {
                tracing::warn!("rejected: malware detected");
                return Err(PipelineError::MalwareDetected);
            }
            ScanVerdict::Unavailable => {
                tracing::error!("rejected: security service unavailable");
                return Err(PipelineError::SecurityUnavailable);
            }
        }

        transition(Stage::Converting);
        let pdf = self.converter.convert(&document).await.map_err(|e| {
            tracing::error!(error = %e, "conversion failed");
            PipelineError::from(e)
        })?;

        transition(Stage::Analyzing);
        let report = self.analyze(&document, &pdf).await;

        self.audit.record(&AuditRecord::new(document.filename(), report.clone()));
        transition(Stage::Completed);

        Ok(ConvertedDocument { pdf, report })
    }

    /// Run the CPU-bound analysis on the blocking pool.
    async fn analyze(&self, document: &Document, pdf: &Bytes) -> FidelityReport {
        let analyzer = self.analyzer;
        let source = document.clone();
        let pdf = pdf.clone();

        match tokio::task::spawn_blocking(move || analyzer.analyze(&source, &pdf)).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "fidelity analysis aborted");
                FidelityReport::default()
            }
        }
    }
}

fn transition(stage: Stage) {
    tracing::debug!(%stage, "pipeline stage");
}
