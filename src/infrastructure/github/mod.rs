//! GitHub repository content retrieval
//!
//! Lists a repository's root entries, filters them to an extension
//! allow-list, and fetches blob contents. Individual file failures are
//! skipped, never escalated to the whole request.

use std::sync::LazyLock;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::errors::SourceError;
use crate::domain::SourceFile;

/// Extensions eligible for analysis.
const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "py", "java", "php", "rb", "go", "rs", "kt", "cs", "cpp", "c", "ts",
];

static REPO_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com/([^/]+)/([^/]+)").expect("valid repo URL pattern"));

/// Extract `(owner, repo)` from a GitHub repository URL. A trailing `.git`
/// on the repository name is stripped. Purely syntactic: no network call.
pub fn parse_repo_url(url: &str) -> Result<(String, String), SourceError> {
    let captures = REPO_URL_RE
        .captures(url)
        .ok_or(SourceError::InvalidRepositoryReference)?;
    let owner = captures[1].to_string();
    let repo = captures[2].trim_end_matches(".git").to_string();
    if owner.is_empty() || repo.is_empty() {
        return Err(SourceError::InvalidRepositoryReference);
    }
    Ok((owner, repo))
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    sha: String,
    #[serde(rename = "type")]
    entry_type: String,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

/// Client for the GitHub REST content API.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    /// Files whose decoded content exceeds this many characters are skipped
    max_file_chars: usize,
}

impl GitHubClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
        max_file_chars: usize,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("codeaudit")
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build GitHub HTTP client with custom settings, using default client");
                Client::new()
            });

        Self {
            client,
            base_url: base_url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
            max_file_chars,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request
    }

    /// List root entries of the repository that are eligible source files,
    /// capped at `limit`.
    async fn list_candidates(
        &self,
        owner: &str,
        repo: &str,
        limit: usize,
    ) -> Result<Vec<ContentEntry>, SourceError> {
        let url = format!("{}/repos/{}/{}/contents", self.base_url, owner, repo);
        let response = self.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(SourceError::Api(format!(
                "listing {}/{} failed with status {}",
                owner, repo, status
            )));
        }

        let entries: Vec<ContentEntry> = response.json().await?;
        let candidates: Vec<ContentEntry> = entries
            .into_iter()
            .filter(|entry| entry.entry_type == "file" && has_source_extension(&entry.name))
            .take(limit)
            .collect();
        Ok(candidates)
    }

    /// Fetch and decode a blob's UTF-8 content.
    async fn fetch_blob(&self, owner: &str, repo: &str, sha: &str) -> Result<String, SourceError> {
        let url = format!("{}/repos/{}/{}/git/blobs/{}", self.base_url, owner, repo, sha);
        let response = self.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "blob fetch failed with status {}",
                response.status()
            )));
        }

        let blob: BlobResponse = response.json().await?;
        if blob.encoding != "base64" {
            return Err(SourceError::Api(format!(
                "unexpected blob encoding: {}",
                blob.encoding
            )));
        }

        let raw: String = blob.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64
            .decode(raw)
            .map_err(|e| SourceError::Api(format!("invalid base64 blob: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| SourceError::Api(format!("blob is not UTF-8: {}", e)))
    }

    /// Collect up to `limit` source files from the repository root.
    ///
    /// Oversized and unfetchable files are skipped with a warning; an empty
    /// result is a valid outcome left for the caller to surface.
    pub async fn collect_source_files(
        &self,
        owner: &str,
        repo: &str,
        limit: usize,
    ) -> Result<Vec<SourceFile>, SourceError> {
        let candidates = self.list_candidates(owner, repo, limit).await?;
        debug!(
            owner,
            repo,
            candidates = candidates.len(),
            "Listed repository source candidates"
        );

        let mut files = Vec::with_capacity(candidates.len());
        for entry in candidates {
            let content = match self.fetch_blob(owner, repo, &entry.sha).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %entry.path, error = %e, "Skipping file that could not be retrieved");
                    continue;
                }
            };

            if content.is_empty() || content.chars().count() > self.max_file_chars {
                warn!(path = %entry.path, "Skipping empty or oversized file");
                continue;
            }

            files.push(SourceFile::new(entry.path, content));
        }
        Ok(files)
    }
}

fn has_source_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(stem, ext)| !stem.is_empty() && SOURCE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
