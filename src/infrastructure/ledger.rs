//! In-memory scan ledger
//!
//! Append-only, process-lifetime record of completed scans. Appends are
//! serialized by the write lock so ids stay unique and monotonic; readers
//! clone `Arc` snapshots and never block writers for long.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{Finding, ScanRecord, Summary};

/// A completed analysis waiting for a ledger id.
#[derive(Debug)]
pub struct ScanDraft {
    pub repository: Option<String>,
    pub url: Option<String>,
    pub files: Vec<String>,
    pub vulnerabilities: Vec<Finding>,
    pub summary: Summary,
}

/// Aggregate view over all recorded scans.
#[derive(Debug, Clone)]
pub struct LedgerStats {
    pub total_scans: usize,
    pub total_vulnerabilities: usize,
    /// Unweighted arithmetic mean; 0.0 when the ledger is empty
    pub avg_risk_score: f64,
    /// Most recent scans, insertion order
    pub recent: Vec<Arc<ScanRecord>>,
}

/// How many scans the dashboard stats view carries.
const DASHBOARD_RECENT: usize = 10;

/// Process-lifetime scan history. No persistence across restarts and no
/// eviction.
#[derive(Default)]
pub struct ScanLedger {
    scans: RwLock<Vec<Arc<ScanRecord>>>,
}

impl ScanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed scan, assigning the next id (1-based, monotonic).
    pub async fn append(&self, draft: ScanDraft) -> Arc<ScanRecord> {
        let mut scans = self.scans.write().await;
        let record = Arc::new(ScanRecord {
            id: scans.len() as u64 + 1,
            timestamp: Utc::now(),
            repository: draft.repository,
            url: draft.url,
            files: draft.files,
            vulnerabilities: draft.vulnerabilities,
            summary: draft.summary,
        });
        scans.push(record.clone());
        record
    }

    /// Fetch a scan by id.
    pub async fn get(&self, id: u64) -> Option<Arc<ScanRecord>> {
        let scans = self.scans.read().await;
        scans.iter().find(|scan| scan.id == id).cloned()
    }

    /// The most recent `limit` scans, in original insertion order.
    pub async fn recent(&self, limit: usize) -> Vec<Arc<ScanRecord>> {
        let scans = self.scans.read().await;
        let start = scans.len().saturating_sub(limit);
        scans[start..].to_vec()
    }

    /// Aggregate statistics for the dashboard view.
    pub async fn stats(&self) -> LedgerStats {
        let scans = self.scans.read().await;
        let total_scans = scans.len();
        let total_vulnerabilities = scans.iter().map(|scan| scan.vulnerabilities.len()).sum();
        let avg_risk_score = if total_scans > 0 {
            scans
                .iter()
                .map(|scan| scan.summary.risk_score as f64)
                .sum::<f64>()
                / total_scans as f64
        } else {
            0.0
        };
        let start = scans.len().saturating_sub(DASHBOARD_RECENT);
        LedgerStats {
            total_scans,
            total_vulnerabilities,
            avg_risk_score,
            recent: scans[start..].to_vec(),
        }
    }
}
