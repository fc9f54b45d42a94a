//! Core domain types for scan results and risk scoring

pub mod finding;
pub mod scan;
pub mod score;
pub mod source;

pub use finding::{Finding, ParsedFinding, Severity, SeverityCounts};
pub use scan::{ScanRecord, Summary};
pub use score::risk_score;
pub use source::{AnalysisDepth, SourceFile};
