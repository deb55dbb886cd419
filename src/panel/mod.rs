//! The client sync controller.
//!
//! `Panel` owns the typed view, the backend client and the stop handles of
//! the two poll loops. Form edits, option loading and commands are in the
//! `options` and `commands` submodules.

use crate::api::ApiClient;
use crate::config::{PanelConfig, SyncConfig};
use crate::error::Result;
use crate::metrics::{SyncMetrics, SyncSnapshot};
use crate::output::Presenter;
use crate::sync::{
    DashboardTask, LoopHealth, LoopKind, PollHandle, PollSchedule, PollTask, ResultsTask,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

pub mod commands;
pub mod options;
pub mod view;

pub use commands::{CommandOutcome, NOTHING_TO_SAVE, SaveOutcome, VALIDATION_MESSAGE};
pub use view::{Checkbox, EXPORT_FIELDS, Feed, FeedColor, FeedKind, FeedLine, PanelView};

pub struct Panel {
    client: ApiClient,
    view: Arc<Mutex<PanelView>>,
    presenter: Arc<dyn Presenter>,
    sync: SyncConfig,
    export_dir: PathBuf,
    metrics: SyncMetrics,
    pollers: Mutex<Vec<PollHandle>>,
}

impl Panel {
    pub fn new(config: &PanelConfig, presenter: Arc<dyn Presenter>) -> Result<Self> {
        let client = ApiClient::new(
            &config.base_url,
            config.request_timeout(),
            &config.user_agent,
        )?;
        Ok(Self::with_client(client, config, presenter))
    }

    pub fn with_client(
        client: ApiClient,
        config: &PanelConfig,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            client,
            view: Arc::new(Mutex::new(PanelView::new(config.defaults))),
            presenter,
            sync: config.sync.clone(),
            export_dir: config.export_dir.clone(),
            metrics: SyncMetrics::new(),
            pollers: Mutex::new(Vec::new()),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn set_export_dir(&mut self, dir: PathBuf) {
        self.export_dir = dir;
    }

    /// Locks the view for reading or editing form fields.
    pub async fn view(&self) -> MutexGuard<'_, PanelView> {
        self.view.lock().await
    }

    pub async fn snapshot(&self) -> PanelView {
        self.view.lock().await.clone()
    }

    pub fn metrics(&self) -> SyncSnapshot {
        self.metrics.snapshot()
    }

    /// Starts whichever poll loops are not already running. Returns `true`
    /// when at least one loop was spawned.
    pub async fn start_sync(&self) -> bool {
        let mut pollers = self.pollers.lock().await;
        pollers.retain(|p| p.is_running());

        let mut spawned = false;
        for kind in [LoopKind::Results, LoopKind::Dashboard] {
            if pollers.iter().any(|p| p.kind() == kind) {
                log::debug!("{} poller already running", kind.name());
                continue;
            }
            pollers.push(self.spawn_poller(kind));
            spawned = true;
        }
        spawned
    }

    pub async fn stop_sync(&self) {
        let mut pollers = std::mem::take(&mut *self.pollers.lock().await);
        for poller in pollers.iter_mut() {
            poller.stop().await;
        }
        if !pollers.is_empty() {
            log::info!("Sync stopped");
        }
    }

    pub async fn is_syncing(&self) -> bool {
        self.pollers.lock().await.iter().any(|p| p.is_running())
    }

    pub async fn sync_health(&self) -> Vec<(LoopKind, LoopHealth)> {
        self.pollers
            .lock()
            .await
            .iter()
            .map(|p| (p.kind(), p.health()))
            .collect()
    }

    fn spawn_poller(&self, kind: LoopKind) -> PollHandle {
        let task: Arc<dyn PollTask> = match kind {
            LoopKind::Results => Arc::new(ResultsTask::new(
                self.client.clone(),
                self.view.clone(),
                self.presenter.clone(),
                self.metrics.clone(),
            )),
            LoopKind::Dashboard => Arc::new(DashboardTask::new(
                self.client.clone(),
                self.view.clone(),
                self.presenter.clone(),
            )),
        };
        PollHandle::spawn(
            task,
            PollSchedule::for_kind(kind, &self.sync),
            self.presenter.clone(),
            self.metrics.clone(),
        )
    }
}
