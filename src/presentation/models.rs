//! API request and response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AnalysisDepth, Finding, ScanRecord, Summary};
use crate::infrastructure::ledger::LedgerStats;

/// JSON variant of the upload endpoint: a single code snippet.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CodeSnippetRequest {
    /// Source code to analyze
    #[schema(example = "eval(user_input)")]
    pub code: String,
    /// Filename used for finding tags and extension-keyed fallbacks
    #[schema(example = "handler.py")]
    pub filename: Option<String>,
}

/// Request model for repository analysis
#[derive(Debug, Deserialize, ToSchema)]
pub struct RepoAnalysisRequest {
    /// GitHub repository URL
    #[schema(example = "https://github.com/owner/repo")]
    pub url: String,
    /// Scan depth: "quick" caps candidate files at 5, "deep" at 20
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "deep")]
    pub depth: AnalysisDepth,
}

/// Response model for upload analysis
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadAnalysisResponse {
    pub vulnerabilities: Vec<Finding>,
    pub summary: Summary,
}

/// Finding list nested under `results` for dashboard compatibility
#[derive(Debug, Serialize, ToSchema)]
pub struct NestedFindings {
    pub vulnerabilities: Vec<Finding>,
}

/// Response model for repository analysis
#[derive(Debug, Serialize, ToSchema)]
pub struct RepoAnalysisResponse {
    /// `owner/repo`
    #[schema(example = "owner/repo")]
    pub repository: String,
    pub files_analyzed: usize,
    pub vulnerabilities: Vec<Finding>,
    pub summary: Summary,
    pub results: NestedFindings,
}

/// Query parameters for the scan listing endpoint
#[derive(Debug, Deserialize)]
pub struct ScansQuery {
    /// Number of most recent scans to return
    pub limit: Option<usize>,
}

/// Aggregate counters over all recorded scans
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardOverview {
    pub total_scans: usize,
    pub total_vulnerabilities: usize,
    /// Unweighted mean risk score; 0.0 when no scans exist
    pub avg_risk_score: f64,
}

/// Response model for dashboard statistics
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStatsResponse {
    pub overview: DashboardOverview,
    /// Most recent scans, insertion order
    pub scans: Vec<ScanRecord>,
}

impl From<LedgerStats> for DashboardStatsResponse {
    fn from(stats: LedgerStats) -> Self {
        Self {
            overview: DashboardOverview {
                total_scans: stats.total_scans,
                total_vulnerabilities: stats.total_vulnerabilities,
                avg_risk_score: stats.avg_risk_score,
            },
            scans: stats.recent.iter().map(|scan| (**scan).clone()).collect(),
        }
    }
}

/// Liveness probe payload
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "codeaudit")]
    pub service: &'static str,
}

/// Structured error body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
