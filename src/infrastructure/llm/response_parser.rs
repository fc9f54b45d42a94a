//! Extraction of the vulnerability report from free-form model replies
//!
//! Model output may be bare JSON, JSON inside a fenced code block, or JSON
//! surrounded by prose. Extraction runs an explicit ordered strategy list and
//! reports failure as a value, never via panics.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::IncompleteFindingPolicy;
use crate::domain::ParsedFinding;

use super::error::LlmError;

#[derive(Debug, Deserialize)]
struct RawReport {
    vulnerabilities: Vec<Value>,
}

/// Utilities for extracting and parsing the vulnerability list from LLM
/// responses.
pub struct ResponseParser;

impl ResponseParser {
    /// Parse a model reply into findings.
    ///
    /// Extraction strategy order:
    /// 1) the full trimmed content as JSON;
    /// 2) a fenced code block labeled `json`;
    /// 3) any fenced code block;
    /// 4) the greedy brace span from the first `{` to the last `}`.
    ///
    /// The extracted object must carry a `vulnerabilities` array. Individual
    /// findings with missing or mistyped fields are dropped or defaulted per
    /// `policy`; only a reply with no extractable report at all is an error.
    pub fn parse_findings(
        content: &str,
        policy: IncompleteFindingPolicy,
    ) -> Result<Vec<ParsedFinding>, LlmError> {
        let report = Self::extract_report(content)?;
        let total = report.vulnerabilities.len();
        let findings: Vec<ParsedFinding> = report
            .vulnerabilities
            .iter()
            .filter_map(|value| Self::finding_from_value(value, policy))
            .collect();
        if findings.len() < total {
            debug!(
                dropped = total - findings.len(),
                "Discarded incomplete findings from model reply"
            );
        }
        Ok(findings)
    }

    fn extract_report(content: &str) -> Result<RawReport, LlmError> {
        let trimmed = content.trim();

        if let Ok(report) = serde_json::from_str::<RawReport>(trimmed) {
            return Ok(report);
        }

        if let Some(block) = Self::extract_fenced_block(trimmed, Some("json"))
            && let Ok(report) = serde_json::from_str::<RawReport>(&block)
        {
            return Ok(report);
        }

        if let Some(block) = Self::extract_fenced_block(trimmed, None)
            && let Ok(report) = serde_json::from_str::<RawReport>(&block)
        {
            return Ok(report);
        }

        if let Some(span) = Self::extract_brace_span(trimmed)
            && let Ok(report) = serde_json::from_str::<RawReport>(span)
        {
            return Ok(report);
        }

        Err(LlmError::invalid_response(
            "Failed to extract a vulnerability report from LLM response",
        ))
    }

    /// Extract the body of a fenced code block, optionally requiring a
    /// language tag. Scans past non-matching fences.
    fn extract_fenced_block(content: &str, language: Option<&str>) -> Option<String> {
        const FENCE: &str = "```";
        let mut search = content;

        loop {
            let start = search.find(FENCE)?;
            let after_fence = &search[start + FENCE.len()..];
            let line_end = after_fence.find('\n')?;
            let tag = after_fence[..line_end].trim();
            let body = &after_fence[line_end + 1..];

            if let Some(expected) = language
                && !tag.eq_ignore_ascii_case(expected)
            {
                search = after_fence;
                continue;
            }

            let end = body.find(FENCE)?;
            return Some(body[..end].trim().to_string());
        }
    }

    /// Greedy brace span: first `{` to last `}`.
    fn extract_brace_span(content: &str) -> Option<&str> {
        let start = content.find('{')?;
        let end = content.rfind('}')?;
        if end < start {
            return None;
        }
        Some(&content[start..=end])
    }

    fn finding_from_value(
        value: &Value,
        policy: IncompleteFindingPolicy,
    ) -> Option<ParsedFinding> {
        let title = value.get("title").and_then(Value::as_str);
        let severity = value.get("severity").and_then(Value::as_str);
        let line = value
            .get("line")
            .and_then(Value::as_u64)
            .filter(|line| (1..=u32::MAX as u64).contains(line))
            .map(|line| line as u32);
        let description = value.get("description").and_then(Value::as_str);
        let fix = value.get("fix").and_then(Value::as_str);

        match policy {
            IncompleteFindingPolicy::Drop => Some(ParsedFinding {
                title: title?.to_string(),
                severity: severity?.to_string(),
                line: line?,
                description: description.unwrap_or_default().to_string(),
                fix: fix.unwrap_or_default().to_string(),
            }),
            IncompleteFindingPolicy::Fill => Some(ParsedFinding {
                title: title.unwrap_or("Unspecified Finding").to_string(),
                severity: severity.unwrap_or("Medium").to_string(),
                line: line.unwrap_or(1),
                description: description.unwrap_or_default().to_string(),
                fix: fix.unwrap_or_default().to_string(),
            }),
        }
    }
}
