//! Vulnerability findings and severity classification

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Canonical severity levels recognized by the scoring function.
///
/// Model replies may carry arbitrary severity strings; anything outside the
/// four canonical values is kept verbatim in the finding list but excluded
/// from severity counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Exact, case-sensitive match against the canonical strings.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Self::Critical),
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A finding as reported by a model reply, before it is tagged with the
/// originating file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFinding {
    pub title: String,
    pub severity: String,
    /// 1-based line number referring to the numbered source shown to the model
    pub line: u32,
    pub description: String,
    pub fix: String,
}

impl ParsedFinding {
    /// Tag with the originating file identity, producing the final finding.
    pub fn into_finding(self, file: &str, file_path: &str) -> Finding {
        Finding {
            title: self.title,
            severity: self.severity,
            line: self.line,
            description: self.description,
            fix: self.fix,
            file: file.to_string(),
            file_path: file_path.to_string(),
        }
    }
}

/// A reported vulnerability, tagged with the file it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Finding {
    /// Short vulnerability name
    #[schema(example = "SQL Injection")]
    pub title: String,
    /// Severity string as reported by the model (canonical values:
    /// Critical, High, Medium, Low)
    #[schema(example = "High")]
    pub severity: String,
    /// 1-based line number in the analyzed file
    pub line: u32,
    pub description: String,
    /// Remediation guidance
    pub fix: String,
    /// Basename of the analyzed file
    #[schema(example = "login.py")]
    pub file: String,
    /// Full relative path of the analyzed file
    #[schema(example = "src/auth/login.py")]
    pub file_path: String,
}

impl Finding {
    pub fn severity(&self) -> Option<Severity> {
        Severity::parse(&self.severity)
    }
}

/// Per-severity finding counts over the four canonical levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    /// Count findings by exact severity match. Unrecognized severities are
    /// not counted anywhere.
    pub fn count(findings: &[Finding]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            match finding.severity() {
                Some(Severity::Critical) => counts.critical += 1,
                Some(Severity::High) => counts.high += 1,
                Some(Severity::Medium) => counts.medium += 1,
                Some(Severity::Low) => counts.low += 1,
                None => {}
            }
        }
        counts
    }

    pub fn recognized_total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}
