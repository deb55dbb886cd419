use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSnapshot {
    pub results_polls_ok: u64,
    pub results_polls_failed: u64,
    pub dashboard_polls_ok: u64,
    pub dashboard_polls_failed: u64,
    pub feed_lines: u64,
    pub results_received: u64,
    pub success_rate: f64,
    pub elapsed_seconds: f64,
}
