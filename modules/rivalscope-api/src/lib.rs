use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use rivalscope_common::RivalScopeError;
use rivalscope_scout::bootstrap::Pipeline;

pub mod rest;

pub struct AppState {
    /// Startup wiring failures are kept and reported on every request.
    pub pipeline: Result<Pipeline, String>,
}

impl AppState {
    pub fn new(pipeline: Result<Pipeline, RivalScopeError>) -> Self {
        Self {
            pipeline: pipeline.map_err(|e| e.to_string()),
        }
    }

    pub fn pipeline(&self) -> Result<&Pipeline, RivalScopeError> {
        self.pipeline
            .as_ref()
            .map_err(|message| RivalScopeError::Configuration(message.clone()))
    }
}

pub fn app(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/api/analyze", post(rest::api_analyze))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Analyses are per request; never cache them
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path only (uploads stay out of the logs)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
