//! API controllers

use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::header;
use axum::response::Json;
use chrono::Utc;
use tracing::{info, warn};

use crate::application::{AnalyzeFilesUseCase, AnalyzeRepositoryUseCase};
use crate::domain::{ScanRecord, SourceFile};
use crate::infrastructure::ledger::{ScanDraft, ScanLedger};

use super::error::ApiError;
use super::models::{
    CodeSnippetRequest, DashboardStatsResponse, HealthResponse, NestedFindings,
    RepoAnalysisRequest, RepoAnalysisResponse, ScansQuery, UploadAnalysisResponse,
};

/// Default number of scans returned by the listing endpoint
const DEFAULT_SCAN_LIMIT: usize = 5;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyze_files: Arc<AnalyzeFilesUseCase>,
    pub analyze_repository: Arc<AnalyzeRepositoryUseCase>,
    pub ledger: Arc<ScanLedger>,
}

/// POST /api/analyze/upload - Analyze uploaded source files
///
/// Accepts either multipart `files` fields or a JSON body with a single
/// `code` snippet.
#[utoipa::path(
    post,
    path = "/api/analyze/upload",
    request_body = CodeSnippetRequest,
    responses(
        (status = 200, description = "Analysis complete", body = UploadAnalysisResponse),
        (status = 400, description = "No files provided", body = super::models::ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn analyze_upload(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<UploadAnalysisResponse>, ApiError> {
    let files = extract_upload_files(request).await?;
    if files.is_empty() {
        return Err(ApiError::BadRequest(
            "No files provided for analysis".to_string(),
        ));
    }

    info!(files = files.len(), "Analyzing uploaded files");
    let outcome = state.analyze_files.execute(&files).await;
    let summary = outcome.summary(None);

    let record = state
        .ledger
        .append(ScanDraft {
            repository: None,
            url: None,
            files: outcome.files,
            vulnerabilities: outcome.vulnerabilities,
            summary: summary.clone(),
        })
        .await;

    Ok(Json(UploadAnalysisResponse {
        vulnerabilities: record.vulnerabilities.clone(),
        summary,
    }))
}

/// Pull source files out of either upload body variant.
async fn extract_upload_files(request: Request) -> Result<Vec<SourceFile>, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?;

        let mut files = Vec::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
        {
            let Some(file_name) = field.file_name().map(str::to_string) else {
                continue;
            };
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            match String::from_utf8(bytes.to_vec()) {
                Ok(content) => files.push(SourceFile::new(file_name, content)),
                Err(_) => {
                    warn!(file = %file_name, "Skipping upload that is not valid UTF-8");
                }
            }
        }
        Ok(files)
    } else {
        let Json(body): Json<CodeSnippetRequest> = Json::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;

        if body.code.trim().is_empty() {
            return Ok(Vec::new());
        }
        let filename = body
            .filename
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "snippet.txt".to_string());
        Ok(vec![SourceFile::new(filename, body.code)])
    }
}

/// POST /api/analyze/repo - Analyze a GitHub repository
#[utoipa::path(
    post,
    path = "/api/analyze/repo",
    request_body = RepoAnalysisRequest,
    responses(
        (status = 200, description = "Analysis complete", body = RepoAnalysisResponse),
        (status = 400, description = "Invalid URL or no eligible files", body = super::models::ErrorResponse),
        (status = 500, description = "Repository listing failed", body = super::models::ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn analyze_repo(
    State(state): State<AppState>,
    Json(request): Json<RepoAnalysisRequest>,
) -> Result<Json<RepoAnalysisResponse>, ApiError> {
    info!(url = %request.url, depth = ?request.depth, "Analyzing GitHub repository");

    let result = state
        .analyze_repository
        .execute(&request.url, request.depth)
        .await?;

    let summary = result.outcome.summary(Some(result.outcome.files.len()));
    let record = state
        .ledger
        .append(ScanDraft {
            repository: Some(result.repository.clone()),
            url: Some(request.url),
            files: result.outcome.files,
            vulnerabilities: result.outcome.vulnerabilities,
            summary: summary.clone(),
        })
        .await;

    Ok(Json(RepoAnalysisResponse {
        repository: result.repository,
        files_analyzed: record.files.len(),
        vulnerabilities: record.vulnerabilities.clone(),
        summary,
        results: NestedFindings {
            vulnerabilities: record.vulnerabilities.clone(),
        },
    }))
}

/// GET /api/scans - List the most recent scans
#[utoipa::path(
    get,
    path = "/api/scans",
    params(("limit" = Option<usize>, Query, description = "Number of scans to return (default 5)")),
    responses((status = 200, description = "Recent scans", body = [ScanRecord])),
    tag = "scans"
)]
pub async fn list_scans(
    State(state): State<AppState>,
    Query(query): Query<ScansQuery>,
) -> Json<Vec<ScanRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_SCAN_LIMIT);
    let scans = state
        .ledger
        .recent(limit)
        .await
        .iter()
        .map(|scan| (**scan).clone())
        .collect();
    Json(scans)
}

/// GET /api/scans/{id} - Fetch a single scan by id
#[utoipa::path(
    get,
    path = "/api/scans/{id}",
    params(("id" = u64, Path, description = "Scan id")),
    responses(
        (status = 200, description = "Scan found", body = ScanRecord),
        (status = 404, description = "Scan not found", body = super::models::ErrorResponse)
    ),
    tag = "scans"
)]
pub async fn get_scan(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ScanRecord>, ApiError> {
    match state.ledger.get(id).await {
        Some(scan) => Ok(Json((*scan).clone())),
        None => Err(ApiError::NotFound("Scan not found".to_string())),
    }
}

/// GET /api/dashboard/stats - Aggregate scan statistics
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses((status = 200, description = "Dashboard statistics", body = DashboardStatsResponse)),
    tag = "scans"
)]
pub async fn dashboard_stats(State(state): State<AppState>) -> Json<DashboardStatsResponse> {
    Json(state.ledger.stats().await.into())
}

/// GET /health - Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse)),
    tag = "health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        service: "codeaudit",
    })
}
