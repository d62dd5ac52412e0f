// Web server: Axum-based JSON API in front of the classifier.
//
// Every classification route answers 200 with either `{"result": ...}` or
// `{"error": "..."}`; errors are in-band, never a protocol-level failure.
// Malformed bodies are still rejected by the Json extractor.
//
// CORS: a single configured origin (the front-end), credentials allowed.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::classify::{Classifier, ClassifyError};

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(
    classifier: Classifier,
    allowed_origin: &str,
    port: u16,
    bind: &str,
) -> Result<()> {
    let origin = HeaderValue::from_str(allowed_origin)
        .with_context(|| format!("Invalid allowed origin: {allowed_origin}"))?;

    let state = AppState {
        classifier: Arc::new(classifier),
    };

    let app = build_router(state, origin);

    let addr = format!("{bind}:{port}");
    info!("Triage API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState, allowed_origin: HeaderValue) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict-text", post(handlers::predict::predict_text))
        .route("/predict-image", post(handlers::predict::predict_image))
        .route("/predict-issue", post(handlers::predict::predict_issue))
        .route("/combine-scores", post(handlers::combine::combine_scores))
        .layer(
            CorsLayer::new()
                .allow_origin(allowed_origin)
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    axum::Json(serde_json::json!({ "message": "API is running!" }))
}

/// Health check: always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// In-band reply body: exactly one of `result` or `error`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Reply<T> {
    Result { result: T },
    Error { error: String },
}

impl<T> Reply<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error {
            error: message.into(),
        }
    }
}

impl<T> From<Result<T, ClassifyError>> for Reply<T> {
    fn from(outcome: Result<T, ClassifyError>) -> Self {
        match outcome {
            Ok(result) => Reply::Result { result },
            Err(e) => {
                if !e.is_invalid_input() {
                    warn!(error = %e, "Classification failed");
                }
                Reply::error(e.to_string())
            }
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}
