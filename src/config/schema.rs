use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PanelConfig {
    /// Backend origin, e.g. `http://localhost:5000`
    #[serde(default)]
    #[validate(length(min = 1))]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1))]
    pub request_timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    #[validate]
    pub sync: SyncConfig,

    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    #[serde(default)]
    pub defaults: SearchDefaults,

    /// Optional path to a parent configuration file to inherit from
    #[serde(default)]
    pub extends: Option<String>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_ms: default_request_timeout(),
            user_agent: default_user_agent(),
            sync: SyncConfig::default(),
            export_dir: default_export_dir(),
            defaults: SearchDefaults::default(),
            extends: None,
        }
    }
}

impl PanelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Timing of the two poll loops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SyncConfig {
    #[serde(default = "default_results_interval")]
    #[validate(range(min = 1))]
    pub results_interval_ms: u64,

    #[serde(default = "default_dashboard_interval")]
    #[validate(range(min = 1))]
    pub dashboard_interval_ms: u64,

    #[serde(default = "default_max_backoff")]
    #[validate(range(min = 1))]
    pub max_backoff_ms: u64,

    /// Consecutive failures before a loop is reported as degraded.
    #[serde(default = "default_failure_threshold")]
    #[validate(range(min = 1))]
    pub failure_threshold: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            results_interval_ms: default_results_interval(),
            dashboard_interval_ms: default_dashboard_interval(),
            max_backoff_ms: default_max_backoff(),
            failure_threshold: default_failure_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDefaults {
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_num_threads")]
    pub num_threads: u32,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            num_threads: default_num_threads(),
        }
    }
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    format!("leadscout/{}", env!("CARGO_PKG_VERSION"))
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_results_interval() -> u64 {
    1_000
}

fn default_dashboard_interval() -> u64 {
    5_000
}

fn default_max_backoff() -> u64 {
    30_000
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_max_pages() -> u32 {
    5
}

fn default_num_threads() -> u32 {
    5
}
