use crate::config::Config;
use crate::constants::{ROOT_MESSAGE, SERVICE_NAME};
use crate::error::{AnalystError, Result};
use crate::pipeline::Pipeline;
use crate::tasks::AnalysisResponse;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl IntoResponse for AnalystError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": ROOT_MESSAGE }))
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Question text from the upload: the `file` field if present, else the first field
async fn read_question(mut multipart: Multipart) -> Result<String> {
    let mut question: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AnalystError::InvalidUpload(e.to_string()))?
    {
        let is_file_field = field.name() == Some("file");
        if question.is_some() && !is_file_field {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AnalystError::InvalidUpload(e.to_string()))?;
        question = Some(bytes.to_vec());
        if is_file_field {
            break;
        }
    }

    let bytes = question.ok_or(AnalystError::MissingQuestion)?;
    Ok(String::from_utf8(bytes)?)
}

async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> std::result::Result<Json<AnalysisResponse>, AnalystError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("analyze", %request_id);

    async move {
        let question = read_question(multipart).await?;
        match state.pipeline.answer(&question).await {
            Ok(response) => {
                info!("Question answered");
                Ok(Json(response))
            }
            Err(e) => {
                if e.status_code().is_server_error() {
                    error!(kind = e.kind(), "Analysis failed: {}", e);
                } else {
                    warn!(kind = e.kind(), "Rejected question: {}", e);
                }
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

/// Create the HTTP router with all routes
pub fn create_server(pipeline: Arc<Pipeline>, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/", post(analyze))
        .route("/api", post(analyze))
        .with_state(AppState { pipeline })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(cors),
        )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Start the HTTP server on the configured host and port
pub async fn start_server(pipeline: Arc<Pipeline>, config: &Config) -> anyhow::Result<()> {
    let app = create_server(pipeline, config.request_timeout());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    println!("🚀 HTTP server running on http://{addr}");
    println!("💚 Health check: http://{addr}/health");
    println!("🔎 Analyze:      POST http://{addr}/api/ (multipart field 'file')");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
