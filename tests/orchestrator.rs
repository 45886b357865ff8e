// Pipeline tests with deterministic collaborators: no network involved.

mod common;

use common::{docx_with_fonts, pdf_with_fonts, StaticConverter};
use printgate::audit::MemoryAuditSink;
use printgate::orchestrator::Orchestrator;
use printgate::{
    ConversionFailure, Document, FidelityStatus, PipelineError, ScanVerdict, StaticSecurityGate,
};
use std::sync::Arc;

struct Harness {
    gate: Arc<StaticSecurityGate>,
    converter: Arc<StaticConverter>,
    audit: Arc<MemoryAuditSink>,
    orchestrator: Orchestrator,
}

fn harness(verdict: ScanVerdict, converter: StaticConverter) -> Harness {
    let gate = Arc::new(StaticSecurityGate::new(verdict));
    let converter = Arc::new(converter);
    let audit = Arc::new(MemoryAuditSink::new());
    let orchestrator = Orchestrator::new(gate.clone(), converter.clone(), audit.clone());
    Harness {
        gate,
        converter,
        audit,
        orchestrator,
    }
}

fn report_docx() -> Document {
    Document::new("report.docx", docx_with_fonts(&["Calibri"]))
}

#[tokio::test]
async fn substituted_conversion_completes_with_audit_record() {
    let pdf = pdf_with_fonts(&["ABCDEF+Carlito"]);
    let h = harness(ScanVerdict::Clean, StaticConverter::returning(pdf.clone()));

    let converted = h.orchestrator.process(report_docx()).await.unwrap();

    assert_eq!(converted.pdf.as_ref(), pdf.as_slice());
    assert_eq!(converted.fidelity_status(), FidelityStatus::Substituted);
    assert_eq!(h.gate.calls(), 1);
    assert_eq!(h.converter.calls(), 1);

    let records = h.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].filename, "report.docx");
    assert_eq!(records[0].status, FidelityStatus::Substituted);
    assert_eq!(records[0].report, converted.report);
}

#[tokio::test]
async fn plain_text_with_spaced_family_is_exact() {
    let pdf = pdf_with_fonts(&["Liberation Sans"]);
    let h = harness(ScanVerdict::Clean, StaticConverter::returning(pdf));

    let converted = h
        .orchestrator
        .process(Document::new("notes.txt", b"hello".to_vec()))
        .await
        .unwrap();

    assert!(converted.report.requested.is_empty());
    assert_eq!(converted.fidelity_status(), FidelityStatus::Exact);
    assert_eq!(h.audit.len(), 1);
}

#[tokio::test]
async fn infected_document_is_never_converted() {
    let h = harness(
        ScanVerdict::Infected,
        StaticConverter::returning(pdf_with_fonts(&["Carlito"])),
    );

    let err = h.orchestrator.process(report_docx()).await.unwrap_err();

    assert_eq!(err, PipelineError::MalwareDetected);
    assert_eq!(h.converter.calls(), 0);
    assert!(h.audit.is_empty());
}

#[tokio::test]
async fn unavailable_scanner_is_never_treated_as_clean() {
    let h = harness(
        ScanVerdict::Unavailable,
        StaticConverter::returning(pdf_with_fonts(&["Carlito"])),
    );

    let err = h.orchestrator.process(report_docx()).await.unwrap_err();

    assert_eq!(err, PipelineError::SecurityUnavailable);
    assert_eq!(err.status_code(), 503);
    assert_eq!(h.converter.calls(), 0);
    assert!(h.audit.is_empty());
}

#[tokio::test]
async fn conversion_timeout_fails_without_audit() {
    let h = harness(
        ScanVerdict::Clean,
        StaticConverter::failing(ConversionFailure::Timeout),
    );

    let err = h.orchestrator.process(report_docx()).await.unwrap_err();

    assert_eq!(err, PipelineError::ConversionTimeout);
    assert_eq!(h.converter.calls(), 1);
    assert!(h.audit.is_empty());
}

#[tokio::test]
async fn engine_error_fails_without_audit() {
    let h = harness(
        ScanVerdict::Clean,
        StaticConverter::failing(ConversionFailure::EngineError),
    );

    let err = h.orchestrator.process(report_docx()).await.unwrap_err();

    assert_eq!(err, PipelineError::ConversionEngineFailure);
    assert!(h.audit.is_empty());
}

#[tokio::test]
async fn unparseable_engine_output_still_completes() {
    let h = harness(
        ScanVerdict::Clean,
        StaticConverter::returning(b"definitely not a pdf".to_vec()),
    );

    let converted = h.orchestrator.process(report_docx()).await.unwrap();

    assert_eq!(converted.report.requested.len(), 1);
    assert!(converted.report.actual.is_empty());
    assert_eq!(converted.fidelity_status(), FidelityStatus::Exact);
    assert_eq!(h.audit.len(), 1);
}

#[tokio::test]
async fn identical_requests_produce_identical_reports() {
    let h = harness(
        ScanVerdict::Clean,
        StaticConverter::returning(pdf_with_fonts(&["ABCDEF+Carlito", "Arial"])),
    );

    let first = h.orchestrator.process(report_docx()).await.unwrap();
    let second = h.orchestrator.process(report_docx()).await.unwrap();

    assert_eq!(first.report, second.report);
    let records = h.audit.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], records[1]);
}

#[tokio::test]
async fn concurrent_requests_each_get_one_record() {
    let h = harness(
        ScanVerdict::Clean,
        StaticConverter::returning(pdf_with_fonts(&["ABCDEF+Carlito"])),
    );
    let orchestrator = Arc::new(h.orchestrator);

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                let doc = Document::new(format!("doc-{i}.docx"), docx_with_fonts(&["Calibri"]));
                orchestrator.process(doc).await
            })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }

    assert_eq!(h.audit.len(), 8);
    assert_eq!(h.converter.calls(), 8);
}
