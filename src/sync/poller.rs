use crate::config::SyncConfig;
use crate::error::Result;
use crate::metrics::SyncMetrics;
use crate::output::Presenter;
use crate::sync::backoff::backoff_delay;
use crate::sync::{LoopHealth, LoopKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// One fetch-and-render iteration of a poll loop.
#[async_trait]
pub trait PollTask: Send + Sync + 'static {
    fn kind(&self) -> LoopKind;
    async fn tick(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub max_backoff: Duration,
    pub failure_threshold: u32,
}

impl PollSchedule {
    pub fn for_kind(kind: LoopKind, sync: &SyncConfig) -> Self {
        let interval_ms = match kind {
            LoopKind::Results => sync.results_interval_ms,
            LoopKind::Dashboard => sync.dashboard_interval_ms,
        };
        Self {
            interval: Duration::from_millis(interval_ms),
            max_backoff: Duration::from_millis(sync.max_backoff_ms),
            failure_threshold: sync.failure_threshold.max(1),
        }
    }
}

/// Stop handle of a running poll loop. Dropping it also stops the loop.
pub struct PollHandle {
    kind: LoopKind,
    shutdown: watch::Sender<bool>,
    health: watch::Receiver<LoopHealth>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn spawn(
        task: Arc<dyn PollTask>,
        schedule: PollSchedule,
        presenter: Arc<dyn Presenter>,
        metrics: SyncMetrics,
    ) -> Self {
        let kind = task.kind();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (health_tx, health_rx) = watch::channel(LoopHealth::Healthy);

        let handle = tokio::spawn(run_loop(
            task,
            schedule,
            shutdown_rx,
            health_tx,
            presenter,
            metrics,
        ));
        log::debug!("Started {} poller ({:?} interval)", kind.name(), schedule.interval);

        Self {
            kind,
            shutdown: shutdown_tx,
            health: health_rx,
            task: Some(handle),
        }
    }

    pub fn kind(&self) -> LoopKind {
        self.kind
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn health(&self) -> LoopHealth {
        *self.health.borrow()
    }

    pub fn watch_health(&self) -> watch::Receiver<LoopHealth> {
        self.health.clone()
    }

    /// Signals the loop and waits for it to exit. An in-flight fetch is abandoned.
    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!("{} poller ended abnormally: {}", self.kind.name(), e);
            }
        }
        log::debug!("Stopped {} poller", self.kind.name());
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn run_loop(
    task: Arc<dyn PollTask>,
    schedule: PollSchedule,
    mut shutdown: watch::Receiver<bool>,
    health: watch::Sender<LoopHealth>,
    presenter: Arc<dyn Presenter>,
    metrics: SyncMetrics,
) {
    let kind = task.kind();
    let mut failures: u32 = 0;

    loop {
        let stopping = *shutdown.borrow();
        if stopping {
            break;
        }

        let outcome = tokio::select! {
            _ = shutdown.changed() => break,
            res = task.tick() => res,
        };

        let delay = match outcome {
            Ok(()) => {
                metrics.record_poll(kind, true);
                if failures >= schedule.failure_threshold {
                    log::info!("{} sync recovered after {} failures", kind.name(), failures);
                }
                failures = 0;
                health.send_replace(LoopHealth::Healthy);
                schedule.interval
            }
            Err(e) => {
                metrics.record_poll(kind, false);
                failures = failures.saturating_add(1);
                let delay = backoff_delay(schedule.interval, failures, schedule.max_backoff);
                log::warn!(
                    "{} poll failed ({} in a row), retrying in {:?}: {}",
                    kind.name(),
                    failures,
                    delay,
                    e
                );

                if failures >= schedule.failure_threshold {
                    health.send_replace(LoopHealth::Degraded {
                        consecutive_failures: failures,
                    });
                }
                if failures == schedule.failure_threshold {
                    presenter.alert(&format!(
                        "A sincronização de {} está falhando: {}",
                        kind.label(),
                        e
                    ));
                }
                delay
            }
        };

        tokio::select! {
            _ = shutdown.changed() => break,
            _ = sleep(delay) => {}
        }
    }

    health.send_replace(LoopHealth::Stopped);
}
