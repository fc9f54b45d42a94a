//! CodeAudit - LLM-backed source code security audit API
//!
//! Accepts source code via file upload or a GitHub repository URL, forwards
//! it to an LLM completion API with a vulnerability-scanning prompt, and
//! aggregates the parsed findings into a bounded risk score and an in-memory
//! scan history.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── domain/           # Findings, severities, scoring, scan records
//! ├── application/      # Analysis use cases and error taxonomy
//! ├── infrastructure/   # LLM fallback chain, GitHub client, scan ledger
//! ├── presentation/     # Axum routes, DTOs, API error mapping
//! └── config/           # Configuration management
//! ```
//!
//! # Configuration
//!
//! Environment variables use the `CODEAUDIT__` prefix with double underscore
//! separators:
//!
//! ```bash
//! CODEAUDIT__SERVER__PORT=3000
//! CODEAUDIT__LLM__API_KEY=sk-...
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

mod app;

pub use app::create_app;
pub use config::Config;
pub use logging::init_tracing;
pub use presentation::AppState;
