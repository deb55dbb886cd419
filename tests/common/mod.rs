#![allow(dead_code)]

use leadscout::api::schema::DashboardSnapshot;
use leadscout::config::{PanelConfig, SyncConfig};
use leadscout::output::Presenter;
use leadscout::panel::{FeedLine, Panel, PanelView};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::MockServer;

/// Presenter that records everything the panel shows.
#[derive(Default)]
pub struct Recorder {
    alerts: Mutex<Vec<String>>,
    feed: Mutex<Vec<FeedLine>>,
    dashboards: Mutex<Vec<DashboardSnapshot>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn feed(&self) -> Vec<FeedLine> {
        self.feed.lock().unwrap().clone()
    }

    pub fn dashboards(&self) -> Vec<DashboardSnapshot> {
        self.dashboards.lock().unwrap().clone()
    }
}

impl Presenter for Recorder {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn feed_appended(&self, lines: &[FeedLine]) {
        self.feed.lock().unwrap().extend_from_slice(lines);
    }

    fn dashboard_updated(&self, snapshot: &DashboardSnapshot) {
        self.dashboards.lock().unwrap().push(snapshot.clone());
    }
}

pub fn fast_config(server: &MockServer, export_dir: &Path) -> PanelConfig {
    PanelConfig {
        base_url: server.uri(),
        request_timeout_ms: 2_000,
        sync: SyncConfig {
            results_interval_ms: 20,
            dashboard_interval_ms: 20,
            max_backoff_ms: 60,
            failure_threshold: 2,
        },
        export_dir: export_dir.to_path_buf(),
        ..PanelConfig::default()
    }
}

pub fn panel(server: &MockServer, export_dir: &Path, recorder: &Arc<Recorder>) -> Panel {
    Panel::new(&fast_config(server, export_dir), recorder.clone()).expect("panel")
}

/// Polls the view until `check` holds, panicking after a few seconds.
pub async fn wait_for<F>(panel: &Panel, check: F)
where
    F: Fn(&PanelView) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if check(&*panel.view().await) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}
