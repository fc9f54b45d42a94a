//! Scan records and summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::finding::{Finding, SeverityCounts};
use super::score::risk_score;

/// Aggregated severity counts and risk score for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Summary {
    /// Number of files analyzed; present only for repository scans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_files: Option<usize>,
    pub total_vulnerabilities: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Bounded risk score in [15, 100]
    #[schema(minimum = 15, maximum = 100)]
    pub risk_score: u8,
}

impl Summary {
    /// Build a summary from a finding list. Unrecognized severities count
    /// toward `total_vulnerabilities` but not toward any severity bucket.
    pub fn from_findings(findings: &[Finding], total_files: Option<usize>) -> Self {
        let counts = SeverityCounts::count(findings);
        Self {
            total_files,
            total_vulnerabilities: findings.len(),
            critical: counts.critical,
            high: counts.high,
            medium: counts.medium,
            low: counts.low,
            risk_score: risk_score(counts),
        }
    }
}

/// One completed analysis request, as recorded in the scan ledger.
///
/// Immutable after creation; the ledger assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScanRecord {
    /// 1-based, monotonically increasing within the process lifetime
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    /// `owner/repo`, present only for repository scans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Original repository URL, present only for repository scans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Identifiers of the analyzed files, in analysis order
    pub files: Vec<String>,
    pub vulnerabilities: Vec<Finding>,
    pub summary: Summary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: &str) -> Finding {
        Finding {
            title: "t".to_string(),
            severity: severity.to_string(),
            line: 1,
            description: String::new(),
            fix: String::new(),
            file: "a.py".to_string(),
            file_path: "a.py".to_string(),
        }
    }

    #[test]
    fn test_summary_counts_and_score() {
        let findings = vec![finding("Critical"), finding("Low"), finding("Nonsense")];
        let summary = Summary::from_findings(&findings, None);
        assert_eq!(summary.total_vulnerabilities, 3);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.low, 1);
        assert_eq!(summary.medium, 0);
        // 100 - (20 + 3)
        assert_eq!(summary.risk_score, 77);
        assert!(summary.total_files.is_none());
    }

    #[test]
    fn test_severity_buckets_never_exceed_total() {
        let findings = vec![finding("High"), finding("weird"), finding("weird")];
        let summary = Summary::from_findings(&findings, Some(2));
        let bucketed = summary.critical + summary.high + summary.medium + summary.low;
        assert!(bucketed <= summary.total_vulnerabilities);
        assert_eq!(summary.total_files, Some(2));
    }

    #[test]
    fn test_total_files_omitted_from_upload_summaries() {
        let summary = Summary::from_findings(&[], None);
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("total_files").is_none());
        assert_eq!(json["risk_score"], 100);
    }
}
