//! Common test utilities and mock implementations

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use tokio::sync::Mutex;

use codeaudit::application::{AnalyzeFilesUseCase, AnalyzeRepositoryUseCase};
use codeaudit::config::{AnalysisConfig, Config, IncompleteFindingPolicy};
use codeaudit::infrastructure::github::GitHubClient;
use codeaudit::infrastructure::ledger::ScanLedger;
use codeaudit::infrastructure::llm::{
    AnalysisStrategy, CompletionRequest, CompletionResponse, HeuristicStrategy, LlmError,
    LlmProvider, ModelClient, ModelStrategy, ProviderInfo, Usage,
};
use codeaudit::presentation::{AppState, create_router};

/// Mock LLM provider that replays a scripted sequence of replies.
pub struct MockLlmProvider {
    /// Replies returned by successive `complete` calls; the last entry
    /// repeats once the script is exhausted
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    /// Captured requests for verification
    pub captured_requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            captured_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(content: &str) -> Self {
        Self::new().then_response(content)
    }

    pub fn with_error(error: LlmError) -> Self {
        Self::new().then_error(error)
    }

    pub fn then_response(self, content: &str) -> Self {
        self.script
            .try_lock()
            .expect("script lock free during setup")
            .push_back(Ok(content.to_string()));
        self
    }

    pub fn then_error(self, error: LlmError) -> Self {
        self.script
            .try_lock()
            .expect("script lock free during setup")
            .push_back(Err(error));
        self
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: "mock",
            name: "Mock Provider",
        }
    }

    fn default_model(&self) -> &str {
        "test-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.captured_requests.lock().await.push(request);

        let mut script = self.script.lock().await;
        let reply = if script.len() > 1 {
            script.pop_front().expect("script not empty")
        } else {
            script
                .front()
                .cloned()
                .unwrap_or_else(|| Err(LlmError::Other("No response configured".to_string())))
        };

        reply.map(|content| CompletionResponse {
            id: "test-response-id".to_string(),
            model: "test-model".to_string(),
            content,
            usage: Usage::default(),
        })
    }
}

/// Chain a provider through primary and fallback model strategies plus the
/// local heuristic, mirroring production wiring.
pub fn model_chain(provider: Arc<MockLlmProvider>) -> Vec<Arc<dyn AnalysisStrategy>> {
    vec![
        Arc::new(ModelStrategy::new(
            provider.clone(),
            "gpt-5",
            0.0,
            2048,
            IncompleteFindingPolicy::Drop,
        )),
        Arc::new(ModelStrategy::new(
            provider,
            "gpt-4o",
            0.0,
            2048,
            IncompleteFindingPolicy::Drop,
        )),
        Arc::new(HeuristicStrategy),
    ]
}

/// Build a test server over the full router with the given strategy chain.
///
/// The GitHub client points at an unroutable local port so repository tests
/// never leave the machine.
pub fn test_server(strategies: Vec<Arc<dyn AnalysisStrategy>>) -> TestServer {
    let model_client = Arc::new(ModelClient::new(strategies));
    let analyze_files = Arc::new(AnalyzeFilesUseCase::new(model_client));
    let github = Arc::new(GitHubClient::new(
        "http://127.0.0.1:9",
        None,
        Duration::from_secs(1),
        50_000,
    ));
    let analyze_repository = Arc::new(AnalyzeRepositoryUseCase::new(
        github,
        analyze_files.clone(),
        &AnalysisConfig::default(),
    ));
    let state = AppState {
        analyze_files,
        analyze_repository,
        ledger: Arc::new(ScanLedger::new()),
    };
    let router = create_router(state, Arc::new(Config::default()));
    TestServer::new(router).expect("test server should build")
}

/// A minimal valid model reply with one finding.
pub fn single_finding_reply(title: &str, severity: &str, line: u32) -> String {
    format!(
        r#"{{"vulnerabilities":[{{"title":"{}","severity":"{}","line":{},"description":"d","fix":"f"}}]}}"#,
        title, severity, line
    )
}
