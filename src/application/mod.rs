//! Use cases orchestrating source retrieval, model analysis, and aggregation

pub mod analyze;
pub mod errors;

pub use analyze::{
    AnalyzeFilesUseCase, AnalyzeRepositoryUseCase, FileAnalysisOutcome, RepositoryAnalysisOutcome,
};
pub use errors::SourceError;
