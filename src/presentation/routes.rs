//! Route definitions and middleware stack

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::config::Config;

use super::controllers::{
    AppState, analyze_repo, analyze_upload, dashboard_stats, get_scan, health_check, list_scans,
};
use super::models::*;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        super::controllers::analyze_upload,
        super::controllers::analyze_repo,
        super::controllers::list_scans,
        super::controllers::get_scan,
        super::controllers::dashboard_stats,
        super::controllers::health_check
    ),
    components(schemas(
        CodeSnippetRequest,
        RepoAnalysisRequest,
        UploadAnalysisResponse,
        RepoAnalysisResponse,
        NestedFindings,
        DashboardOverview,
        DashboardStatsResponse,
        HealthResponse,
        ErrorResponse,
        crate::domain::Finding,
        crate::domain::Summary,
        crate::domain::ScanRecord
    )),
    tags(
        (name = "analysis", description = "Model-backed source code vulnerability analysis"),
        (name = "scans", description = "Scan history and dashboard statistics"),
        (name = "health", description = "Liveness probes")
    ),
    info(
        title = "CodeAudit API",
        version = "0.1.0",
        description = "Analyzes uploaded source files or GitHub repositories for security vulnerabilities using an LLM completion API with deterministic fallbacks."
    )
)]
pub struct ApiDoc;

async fn root_handler() -> Response {
    Json(serde_json::json!({
        "name": "CodeAudit API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "LLM-backed source code security audit service",
        "endpoints": {
            "health": "/health",
            "upload": "/api/analyze/upload",
            "repository": "/api/analyze/repo",
            "scans": "/api/scans",
            "stats": "/api/dashboard/stats"
        }
    }))
    .into_response()
}

/// Build the CORS layer from configuration. A single "*" origin allows any
/// origin; otherwise only the listed origins are accepted.
fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if config.server.allowed_origins.len() == 1 && config.server.allowed_origins[0] == "*" {
        layer.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| {
                        tracing::warn!(origin, "Invalid CORS origin in config; skipping");
                    })
                    .ok()
            })
            .collect();
        layer.allow_origin(origins)
    }
}

/// Create the application router.
pub fn create_router(state: AppState, config: Arc<Config>) -> Router {
    let api_routes = Router::new()
        .route("/analyze/upload", post(analyze_upload))
        .route("/analyze/repo", post(analyze_repo))
        .route("/scans", get(list_scans))
        .route("/scans/{id}", get(get_scan))
        .route("/dashboard/stats", get(dashboard_stats));

    let mut router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .nest("/api", api_routes);

    if config.server.enable_docs {
        router = router.route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );
    }

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )));

    router.layer(service_builder).with_state(state)
}
