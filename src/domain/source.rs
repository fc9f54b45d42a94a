//! Source file units flowing through one analysis request

use serde::Deserialize;

/// A single file queued for analysis. Transient: lives for the duration of
/// one request and is never persisted.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Full relative path (repository mode) or original filename (upload mode)
    pub path: String,
    /// Basename, used for finding tags and extension-keyed fallbacks
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            path,
            name,
            content: content.into(),
        }
    }

    /// Lowercased file extension, without the dot.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// How many repository files a scan is willing to pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    /// First few files only
    Quick,
    /// Full candidate budget
    #[default]
    Deep,
}
