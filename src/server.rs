//! Inbound HTTP endpoint.
//!
//! `POST /process-document` takes a multipart upload with a `file` part and
//! answers with the converted PDF plus an `X-Fidelity-Status` header, or a
//! JSON `{"detail": …}` error.

use crate::audit::TracingAuditSink;
use crate::conversion::GotenbergClient;
use crate::orchestrator::Orchestrator;
use crate::security::HttpSecurityGate;
use crate::{Document, PipelineError, Result, ServiceConfig};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Response header carrying the [`FidelityStatus`](crate::FidelityStatus).
pub const FIDELITY_HEADER: &str = "x-fidelity-status";

/// Multipart field carrying the uploaded document.
pub const UPLOAD_FIELD: &str = "file";

/// Filename used when the upload part carries none.
const FALLBACK_FILENAME: &str = "document";

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(ErrorBody { detail: detail.into() })).into_response()
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        error_response(status, self.detail())
    }
}

/// Router with the document endpoint; `max_upload_bytes` bounds the request body.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/process-document", post(process_document))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn process_document(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let upload = match multipart {
        Ok(multipart) => read_upload(multipart).await,
        Err(rejection) => Err(rejection.body_text()),
    };
    let document = match upload {
        Ok(document) => document,
        Err(detail) => {
            tracing::warn!(%detail, "upload rejected");
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, detail);
        }
    };

    match state.orchestrator.process(document).await {
        Ok(converted) => {
            let status = HeaderValue::from_static(converted.fidelity_status().as_str());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
                    (HeaderName::from_static(FIDELITY_HEADER), status),
                ],
                converted.pdf,
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Pull the `file` part out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> std::result::Result<Document, String> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| format!("invalid multipart body: {e}"))?;
        let Some(field) = field else {
            return Err(format!("missing '{UPLOAD_FIELD}' field"));
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| format!("cannot read '{UPLOAD_FIELD}' field: {e}"))?;

        return Ok(Document::new(filename, data));
    }
}

// ── Startup ──────────────────────────────────────────────────────────────────

/// Wire the live collaborators described by `config` into an orchestrator.
pub fn build_orchestrator(config: &ServiceConfig) -> Result<Orchestrator> {
    let gate = HttpSecurityGate::new(&config.av_url, config.av_timeout)?;
    let converter = GotenbergClient::new(&config.conversion_url, config.conversion_timeout)?;
    Ok(Orchestrator::new(
        Arc::new(gate),
        Arc::new(converter),
        Arc::new(TracingAuditSink),
    ))
}

/// Bind `config.bind_address` and serve until Ctrl-C.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    config.validate()?;
    let orchestrator = build_orchestrator(&config)?;
    let app = router(AppState::new(Arc::new(orchestrator)), config.max_upload_bytes);

    let listener = TcpListener::bind(config.bind_address.as_str()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        conversion_url = %config.conversion_url,
        av_url = %config.av_url,
        "printgate listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("printgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
