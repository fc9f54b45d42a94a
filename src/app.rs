//! Application setup and wiring

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing::{info, warn};

use crate::application::{AnalyzeFilesUseCase, AnalyzeRepositoryUseCase};
use crate::config::Config;
use crate::infrastructure::github::GitHubClient;
use crate::infrastructure::ledger::ScanLedger;
use crate::infrastructure::llm::{
    AnalysisStrategy, HeuristicStrategy, ModelClient, ModelStrategy, OpenAiProvider,
    UnconfiguredStrategy,
};
use crate::presentation::{AppState, create_router};

/// Assemble the analysis fallback chain from configuration.
///
/// With a credential: primary model, fallback model, local heuristic. Without
/// one: a single strategy that degrades every scan to a synthetic explanatory
/// finding instead of failing.
fn build_model_client(config: &Config) -> ModelClient {
    let strategies: Vec<Arc<dyn AnalysisStrategy>> = match config.llm.resolve_api_key() {
        Some(api_key) => {
            let provider = Arc::new(
                OpenAiProvider::new(
                    api_key,
                    &config.llm.primary_model,
                    Duration::from_secs(config.llm.timeout_seconds),
                )
                .with_base_url(&config.llm.base_url),
            );
            vec![
                Arc::new(ModelStrategy::new(
                    provider.clone(),
                    &config.llm.primary_model,
                    config.llm.temperature,
                    config.llm.max_tokens,
                    config.analysis.incomplete_findings,
                )),
                Arc::new(ModelStrategy::new(
                    provider,
                    &config.llm.fallback_model,
                    config.llm.temperature,
                    config.llm.max_tokens,
                    config.analysis.incomplete_findings,
                )),
                Arc::new(HeuristicStrategy),
            ]
        }
        None => {
            warn!("No model API key configured; scans will return a synthetic placeholder finding");
            vec![Arc::new(UnconfiguredStrategy)]
        }
    };
    ModelClient::new(strategies)
}

/// Create the application router from configuration.
pub fn create_app(config: Config) -> Router {
    let config = Arc::new(config);

    let model_client = Arc::new(build_model_client(&config));
    let github = Arc::new(GitHubClient::new(
        &config.github.base_url,
        config.github.resolve_token(),
        Duration::from_secs(config.github.timeout_seconds),
        config.analysis.max_file_chars,
    ));

    let analyze_files = Arc::new(AnalyzeFilesUseCase::new(model_client));
    let analyze_repository = Arc::new(AnalyzeRepositoryUseCase::new(
        github,
        analyze_files.clone(),
        &config.analysis,
    ));
    let ledger = Arc::new(ScanLedger::new());

    info!(
        primary_model = %config.llm.primary_model,
        fallback_model = %config.llm.fallback_model,
        "Application wired"
    );

    let state = AppState {
        analyze_files,
        analyze_repository,
        ledger,
    };
    create_router(state, config)
}
