use crate::api::ApiClient;
use crate::error::Result;
use crate::metrics::SyncMetrics;
use crate::output::Presenter;
use crate::panel::view::PanelView;
use crate::sync::{LoopKind, PollTask};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Pulls new logs and results and appends them to the feed.
pub struct ResultsTask {
    client: ApiClient,
    view: Arc<Mutex<PanelView>>,
    presenter: Arc<dyn Presenter>,
    metrics: SyncMetrics,
}

impl ResultsTask {
    pub fn new(
        client: ApiClient,
        view: Arc<Mutex<PanelView>>,
        presenter: Arc<dyn Presenter>,
        metrics: SyncMetrics,
    ) -> Self {
        Self {
            client,
            view,
            presenter,
            metrics,
        }
    }
}

#[async_trait]
impl PollTask for ResultsTask {
    fn kind(&self) -> LoopKind {
        LoopKind::Results
    }

    async fn tick(&self) -> Result<()> {
        let batch = self.client.get_results().await?;

        let added = {
            let mut view = self.view.lock().await;
            view.feed.append_batch(&batch).to_vec()
        };
        if added.is_empty() {
            return Ok(());
        }
        log::debug!(
            "Feed +{} lines ({} logs, {} results)",
            added.len(),
            batch.logs.len(),
            batch.results.len()
        );
        self.metrics
            .add_feed_lines(added.len() as u64, batch.results.len() as u64);
        self.presenter.feed_appended(&added);
        Ok(())
    }
}

/// Replaces the dashboard counters with the latest server snapshot.
pub struct DashboardTask {
    client: ApiClient,
    view: Arc<Mutex<PanelView>>,
    presenter: Arc<dyn Presenter>,
}

impl DashboardTask {
    pub fn new(client: ApiClient, view: Arc<Mutex<PanelView>>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            client,
            view,
            presenter,
        }
    }
}

#[async_trait]
impl PollTask for DashboardTask {
    fn kind(&self) -> LoopKind {
        LoopKind::Dashboard
    }

    async fn tick(&self) -> Result<()> {
        let snapshot = self.client.dashboard().await?;
        self.view.lock().await.apply_dashboard(snapshot.clone());
        self.presenter.dashboard_updated(&snapshot);
        Ok(())
    }
}
