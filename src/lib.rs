//! # printgate
//!
//! Malware-gated document-to-PDF conversion with font-fidelity reporting.
//!
//! ## What this crate does
//!
//! 1. **Scan**: every upload goes through an external AV service first. Any
//!    doubt (service down, timeout, garbled reply) rejects the document.
//! 2. **Convert**: clean documents are sent to a LibreOffice-compatible
//!    conversion engine (Gotenberg) and come back as PDF bytes.
//! 3. **Analyze**: the fonts the source `.docx` declares are compared with the
//!    fonts embedded in the PDF; the presence of a metric-compatible substitute
//!    (Carlito for Calibri, …) marks the result as `Substituted`.
//! 4. **Report**: the PDF is returned with an `X-Fidelity-Status` header and a
//!    structured audit record is written for every completed request.
//!
//! ## Quick example
//!
//! ```no_run
//! use printgate::{Document, FontFidelityAnalyzer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Document::new("report.docx", std::fs::read("report.docx")?);
//! let pdf = std::fs::read("report.pdf")?;
//!
//! let report = FontFidelityAnalyzer::new().analyze(&source, &pdf);
//! println!("requested : {:?}", report.requested);
//! println!("actual    : {:?}", report.actual);
//! println!("status    : {}", report.status());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;
use thiserror::Error;

mod analyzer;
pub mod audit;
pub mod conversion;
mod document;
pub mod font_table;
mod fonts;
pub mod orchestrator;
mod pdf_fonts;
mod pdf_utils;
pub mod security;
pub mod server;

pub use analyzer::{FidelityReport, FidelityStatus, FontFidelityAnalyzer};
pub use conversion::{ConversionFailure, Converter, GotenbergClient};
pub use document::Document;
pub use fonts::{strip_subset_tag, FontSet, SubstitutionRule, SUBSTITUTION_RULES};
pub use orchestrator::{ConvertedDocument, Orchestrator};
pub use pdf_fonts::PdfFontInventory;
pub use security::{HttpSecurityGate, ScanVerdict, SecurityGate, StaticSecurityGate};

// ── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Full URL of the conversion route, e.g.
    /// `http://gotenberg:3000/forms/libreoffice/convert`.
    pub conversion_url: String,

    /// Full URL of the AV scan endpoint.
    pub av_url: String,

    /// Upper bound for one conversion round trip, response body included.
    pub conversion_timeout: Duration,

    /// Upper bound for one AV round trip. Expiry counts as "service unavailable".
    pub av_timeout: Duration,

    /// Address the HTTP listener binds to.
    pub bind_address: String,

    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            conversion_url: "http://localhost:3000/forms/libreoffice/convert".into(),
            av_url: "https://av-service.internal/v1/scan".into(),
            conversion_timeout: Duration::from_secs(60),
            av_timeout: Duration::from_secs(10),
            bind_address: "0.0.0.0:8000".into(),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl ServiceConfig {
    pub fn with_conversion_url(mut self, url: impl Into<String>) -> Self {
        self.conversion_url = url.into();
        self
    }

    pub fn with_av_url(mut self, url: impl Into<String>) -> Self {
        self.av_url = url.into();
        self
    }

    pub fn with_conversion_timeout(mut self, timeout: Duration) -> Self {
        self.conversion_timeout = timeout;
        self
    }

    pub fn with_av_timeout(mut self, timeout: Duration) -> Self {
        self.av_timeout = timeout;
        self
    }

    pub fn with_bind_address(mut self, address: impl Into<String>) -> Self {
        self.bind_address = address.into();
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("conversion URL", &self.conversion_url), ("AV URL", &self.av_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ServiceError::InvalidConfig(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if self.conversion_timeout.is_zero() || self.av_timeout.is_zero() {
            return Err(ServiceError::InvalidConfig("timeouts must be non-zero".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ServiceError::InvalidConfig("max upload size must be non-zero".into()));
        }
        Ok(())
    }
}

// ── Error types ──────────────────────────────────────────────────────────────

/// The four ways a request can fail. Each one aborts the pipeline and is
/// reported to the caller as a distinct status and message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    /// The AV service could not confirm the document is clean.
    #[error("Security Service Unavailable")]
    SecurityUnavailable,

    /// The AV service reported the document as not clean.
    #[error("Security Alert: Malware Detected")]
    MalwareDetected,

    /// The conversion engine did not answer in time.
    #[error("Conversion Timed Out")]
    ConversionTimeout,

    /// The conversion engine failed or could not be reached.
    #[error("Conversion Engine Failed")]
    ConversionEngineFailure,
}

impl PipelineError {
    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::SecurityUnavailable => 503,
            PipelineError::MalwareDetected => 400,
            PipelineError::ConversionTimeout => 504,
            PipelineError::ConversionEngineFailure => 500,
        }
    }

    /// Message reported to the caller.
    pub fn detail(&self) -> &'static str {
        match self {
            PipelineError::SecurityUnavailable => "Security Service Unavailable",
            PipelineError::MalwareDetected => "Security Alert: Malware Detected",
            PipelineError::ConversionTimeout => "Conversion Timed Out",
            PipelineError::ConversionEngineFailure => "Conversion Engine Failed",
        }
    }
}

impl From<ConversionFailure> for PipelineError {
    fn from(failure: ConversionFailure) -> Self {
        match failure {
            ConversionFailure::Timeout => PipelineError::ConversionTimeout,
            ConversionFailure::EngineError => PipelineError::ConversionEngineFailure,
        }
    }
}

/// Why a font set could not be read. Never escalated: the analyzer turns
/// every one of these into an empty set.
#[derive(Error, Debug)]
pub enum FontExtractionError {
    /// The source bytes are not a readable ZIP package.
    #[error("package error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The package has no member with the given path.
    #[error("package has no '{0}' member")]
    MissingMember(String),

    /// A package member inflates past the configured limit.
    #[error("package member '{member}' exceeds {limit} bytes")]
    MemberTooLarge { member: String, limit: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The font table is not well-formed XML.
    #[error("font table XML error: {0}")]
    Xml(String),

    /// lopdf could not load the converted document.
    #[error("PDF parse error: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Errors that prevent the service from starting or running.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An outbound HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used by the service layer.
pub type Result<T> = std::result::Result<T, ServiceError>;
