//! Analysis use cases
//!
//! Files are processed sequentially, one model call at a time, so a rate
//! limit hit on one file cannot race the next. Per-file failures degrade via
//! the fallback chain; they never abort the batch.

use std::sync::Arc;

use tracing::info;

use crate::config::AnalysisConfig;
use crate::domain::{AnalysisDepth, Finding, SourceFile, Summary};
use crate::infrastructure::github::{GitHubClient, parse_repo_url};
use crate::infrastructure::llm::ModelClient;

use super::errors::SourceError;

/// Result of analyzing one batch of files.
#[derive(Debug)]
pub struct FileAnalysisOutcome {
    /// Identifiers of the analyzed files, in analysis order
    pub files: Vec<String>,
    /// Findings tagged with their originating file, in file order then
    /// model-reported order
    pub vulnerabilities: Vec<Finding>,
}

impl FileAnalysisOutcome {
    pub fn summary(&self, total_files: Option<usize>) -> Summary {
        Summary::from_findings(&self.vulnerabilities, total_files)
    }
}

/// Runs the model client over a set of source files and aggregates the
/// tagged findings.
pub struct AnalyzeFilesUseCase {
    model_client: Arc<ModelClient>,
}

impl AnalyzeFilesUseCase {
    pub fn new(model_client: Arc<ModelClient>) -> Self {
        Self { model_client }
    }

    pub async fn execute(&self, files: &[SourceFile]) -> FileAnalysisOutcome {
        let mut analyzed = Vec::with_capacity(files.len());
        let mut vulnerabilities = Vec::new();

        for file in files {
            let parsed = self.model_client.analyze(file).await;
            info!(file = %file.path, findings = parsed.len(), "Analyzed file");
            analyzed.push(file.path.clone());
            vulnerabilities.extend(
                parsed
                    .into_iter()
                    .map(|finding| finding.into_finding(&file.name, &file.path)),
            );
        }

        FileAnalysisOutcome {
            files: analyzed,
            vulnerabilities,
        }
    }
}

/// Result of a repository analysis.
#[derive(Debug)]
pub struct RepositoryAnalysisOutcome {
    /// `owner/repo`
    pub repository: String,
    pub outcome: FileAnalysisOutcome,
}

/// Resolves a GitHub URL to source files and analyzes them.
pub struct AnalyzeRepositoryUseCase {
    github: Arc<GitHubClient>,
    analyze_files: Arc<AnalyzeFilesUseCase>,
    quick_scan_files: usize,
    deep_scan_files: usize,
}

impl AnalyzeRepositoryUseCase {
    pub fn new(
        github: Arc<GitHubClient>,
        analyze_files: Arc<AnalyzeFilesUseCase>,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            github,
            analyze_files,
            quick_scan_files: config.quick_scan_files,
            deep_scan_files: config.deep_scan_files,
        }
    }

    pub async fn execute(
        &self,
        url: &str,
        depth: AnalysisDepth,
    ) -> Result<RepositoryAnalysisOutcome, SourceError> {
        let (owner, repo) = parse_repo_url(url)?;
        let limit = match depth {
            AnalysisDepth::Quick => self.quick_scan_files,
            AnalysisDepth::Deep => self.deep_scan_files,
        };

        info!(owner, repo, limit, "Fetching repository files");
        let files = self
            .github
            .collect_source_files(&owner, &repo, limit)
            .await?;
        if files.is_empty() {
            return Err(SourceError::NoFilesFound);
        }

        let outcome = self.analyze_files.execute(&files).await;
        info!(
            repository = format!("{}/{}", owner, repo),
            files = outcome.files.len(),
            findings = outcome.vulnerabilities.len(),
            "Repository analysis complete"
        );

        Ok(RepositoryAnalysisOutcome {
            repository: format!("{}/{}", owner, repo),
            outcome,
        })
    }
}
