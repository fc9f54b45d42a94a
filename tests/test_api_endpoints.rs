//! Integration tests for the API endpoints

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{Value, json};

use codeaudit::infrastructure::llm::{LlmError, UnconfiguredStrategy};

use common::{MockLlmProvider, model_chain, single_finding_reply, test_server};

#[tokio::test]
async fn test_health_endpoint() {
    let server = test_server(model_chain(Arc::new(MockLlmProvider::new())));

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "codeaudit");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_root_endpoint_lists_api_surface() {
    let server = test_server(model_chain(Arc::new(MockLlmProvider::new())));

    let response = server.get("/").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["name"], "CodeAudit API");
    assert_eq!(body["endpoints"]["upload"], "/api/analyze/upload");
}

#[tokio::test]
async fn test_upload_json_snippet_returns_findings_and_summary() {
    let provider = Arc::new(MockLlmProvider::with_response(&single_finding_reply(
        "SQL Injection",
        "Critical",
        4,
    )));
    let server = test_server(model_chain(provider));

    let response = server
        .post("/api/analyze/upload")
        .json(&json!({"code": "db.query(input)", "filename": "query.py"}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let findings = body["vulnerabilities"].as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["title"], "SQL Injection");
    assert_eq!(findings[0]["file"], "query.py");
    assert_eq!(findings[0]["file_path"], "query.py");
    assert_eq!(findings[0]["line"], 4);

    assert_eq!(body["summary"]["total_vulnerabilities"], 1);
    assert_eq!(body["summary"]["critical"], 1);
    assert_eq!(body["summary"]["risk_score"], 80);
    assert!(body["summary"].get("total_files").is_none());
}

#[tokio::test]
async fn test_upload_json_without_filename_defaults_to_snippet() {
    let provider = Arc::new(MockLlmProvider::with_response(&single_finding_reply(
        "Hardcoded Secret",
        "High",
        2,
    )));
    let server = test_server(model_chain(provider));

    let response = server
        .post("/api/analyze/upload")
        .json(&json!({"code": "let key = 'abc';"}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["vulnerabilities"][0]["file"], "snippet.txt");
}

#[tokio::test]
async fn test_upload_with_empty_code_is_rejected() {
    let server = test_server(model_chain(Arc::new(MockLlmProvider::new())));

    let response = server
        .post("/api/analyze/upload")
        .json(&json!({"code": "  "}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "No files provided for analysis");
}

#[tokio::test]
async fn test_upload_multipart_tags_findings_per_file() {
    // Provider always fails with a transport error; every file degrades to
    // the extension-keyed heuristic.
    let provider = Arc::new(MockLlmProvider::with_error(LlmError::network(
        "connection reset",
    )));
    let server = test_server(model_chain(provider));

    let form = MultipartForm::new()
        .add_part(
            "files",
            Part::bytes("import os".as_bytes()).file_name("app.py"),
        )
        .add_part(
            "files",
            Part::bytes("let x = 1;".as_bytes()).file_name("web.js"),
        );

    let response = server.post("/api/analyze/upload").multipart(form).await;
    response.assert_status_ok();

    let body: Value = response.json();
    let findings = body["vulnerabilities"].as_array().unwrap();
    // py heuristic yields 2 findings, js yields 1
    assert_eq!(findings.len(), 3);
    assert!(
        findings[..2]
            .iter()
            .all(|f| f["file"] == "app.py" && f["file_path"] == "app.py")
    );
    assert_eq!(findings[2]["file"], "web.js");
    assert_eq!(findings[2]["title"], "Insecure Random Number Generation");

    // 2 Medium + 1 Low: 100 - (8*2 + 3)
    assert_eq!(body["summary"]["medium"], 2);
    assert_eq!(body["summary"]["low"], 1);
    assert_eq!(body["summary"]["risk_score"], 81);
}

#[tokio::test]
async fn test_primary_failure_retries_fallback_model_with_identical_prompt() {
    let provider = Arc::new(
        MockLlmProvider::new()
            .then_error(LlmError::ServiceUnavailable("overloaded".to_string()))
            .then_response(&single_finding_reply("XSS", "Medium", 7)),
    );
    let server = test_server(model_chain(provider.clone()));

    let response = server
        .post("/api/analyze/upload")
        .json(&json!({"code": "document.innerHTML = input;", "filename": "dom.js"}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["vulnerabilities"][0]["title"], "XSS");

    let captured = provider.captured_requests.lock().await;
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].model.as_deref(), Some("gpt-5"));
    assert_eq!(captured[1].model.as_deref(), Some("gpt-4o"));
    // The fallback model receives the identical prompt
    assert_eq!(
        captured[0].messages.last().unwrap().content,
        captured[1].messages.last().unwrap().content
    );
}

#[tokio::test]
async fn test_garbage_model_reply_degrades_to_heuristic() {
    let provider = Arc::new(MockLlmProvider::with_response(
        "I'm sorry, I cannot analyze this file.",
    ));
    let server = test_server(model_chain(provider));

    let response = server
        .post("/api/analyze/upload")
        .json(&json!({"code": "import os", "filename": "tool.py"}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let findings = body["vulnerabilities"].as_array().unwrap();
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0]["title"], "Missing Input Validation");
}

#[tokio::test]
async fn test_fenced_model_reply_is_parsed() {
    let reply = format!(
        "Here is the report:\n```json\n{}\n```\n",
        single_finding_reply("SSRF", "High", 11)
    );
    let provider = Arc::new(MockLlmProvider::with_response(&reply));
    let server = test_server(model_chain(provider));

    let response = server
        .post("/api/analyze/upload")
        .json(&json!({"code": "fetch(url)", "filename": "proxy.js"}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["vulnerabilities"][0]["title"], "SSRF");
    assert_eq!(body["summary"]["high"], 1);
}

#[tokio::test]
async fn test_unconfigured_credential_degrades_to_synthetic_finding() {
    let server = test_server(vec![Arc::new(UnconfiguredStrategy)]);

    let response = server
        .post("/api/analyze/upload")
        .json(&json!({"code": "whatever", "filename": "a.rs"}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let findings = body["vulnerabilities"].as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["title"], "Analysis Not Configured");
    assert_eq!(findings[0]["severity"], "Medium");
    assert_eq!(body["summary"]["medium"], 1);
}

#[tokio::test]
async fn test_repo_with_invalid_url_is_rejected_before_network() {
    let server = test_server(model_chain(Arc::new(MockLlmProvider::new())));

    let response = server
        .post("/api/analyze/repo")
        .json(&json!({"url": "https://bitbucket.org/owner/repo"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid GitHub URL format");
}

#[tokio::test]
async fn test_repo_listing_failure_is_an_internal_error() {
    // The test GitHub client points at an unroutable port, so the listing
    // call itself fails.
    let server = test_server(model_chain(Arc::new(MockLlmProvider::new())));

    let response = server
        .post("/api/analyze/repo")
        .json(&json!({"url": "https://github.com/owner/repo"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Repository analysis failed"));
}

#[tokio::test]
async fn test_scan_history_listing_and_lookup() {
    let provider = Arc::new(MockLlmProvider::with_response(&single_finding_reply(
        "CSRF", "Low", 3,
    )));
    let server = test_server(model_chain(provider));

    for i in 0..3 {
        server
            .post("/api/analyze/upload")
            .json(&json!({"code": format!("snippet {}", i), "filename": "a.js"}))
            .await
            .assert_status_ok();
    }

    // Last two scans, original insertion order
    let response = server.get("/api/scans").add_query_param("limit", 2).await;
    response.assert_status_ok();
    let scans: Vec<Value> = response.json();
    assert_eq!(scans.len(), 2);
    assert_eq!(scans[0]["id"], 2);
    assert_eq!(scans[1]["id"], 3);

    // Default limit returns everything recorded so far
    let response = server.get("/api/scans").await;
    let scans: Vec<Value> = response.json();
    assert_eq!(scans.len(), 3);
    assert_eq!(scans[0]["id"], 1);

    // Lookup by id
    let response = server.get("/api/scans/1").await;
    response.assert_status_ok();
    let scan: Value = response.json();
    assert_eq!(scan["id"], 1);
    assert_eq!(scan["vulnerabilities"].as_array().unwrap().len(), 1);
    assert_eq!(scan["files"][0], "a.js");

    // Unknown id
    let response = server.get("/api/scans/999").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "Scan not found");
}

#[tokio::test]
async fn test_dashboard_stats_aggregate_recorded_scans() {
    let provider = Arc::new(MockLlmProvider::with_response(&single_finding_reply(
        "Weak Crypto",
        "Critical",
        8,
    )));
    let server = test_server(model_chain(provider));

    let response = server.get("/api/dashboard/stats").await;
    let body: Value = response.json();
    assert_eq!(body["overview"]["total_scans"], 0);
    assert_eq!(body["overview"]["avg_risk_score"], 0.0);

    for _ in 0..2 {
        server
            .post("/api/analyze/upload")
            .json(&json!({"code": "md5(password)", "filename": "hash.go"}))
            .await
            .assert_status_ok();
    }

    let response = server.get("/api/dashboard/stats").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["overview"]["total_scans"], 2);
    assert_eq!(body["overview"]["total_vulnerabilities"], 2);
    // Both scans carry one Critical finding: risk score 80 each
    assert_eq!(body["overview"]["avg_risk_score"], 80.0);
    assert_eq!(body["scans"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let server = test_server(model_chain(Arc::new(MockLlmProvider::new())));

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["info"]["title"], "CodeAudit API");
    assert!(body["paths"]["/api/analyze/upload"].is_object());
}
