use crate::metrics::snapshot::SyncSnapshot;
use crate::sync::LoopKind;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::Instant;

/// Counters shared by the poll loops and read by the CLI.
#[derive(Clone)]
pub struct SyncMetrics {
    results_polls_ok: Arc<AtomicU64>,
    results_polls_failed: Arc<AtomicU64>,
    dashboard_polls_ok: Arc<AtomicU64>,
    dashboard_polls_failed: Arc<AtomicU64>,
    feed_lines: Arc<AtomicU64>,
    results_received: Arc<AtomicU64>,
    start_time: Arc<Instant>,
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self {
            results_polls_ok: Arc::new(AtomicU64::new(0)),
            results_polls_failed: Arc::new(AtomicU64::new(0)),
            dashboard_polls_ok: Arc::new(AtomicU64::new(0)),
            dashboard_polls_failed: Arc::new(AtomicU64::new(0)),
            feed_lines: Arc::new(AtomicU64::new(0)),
            results_received: Arc::new(AtomicU64::new(0)),
            start_time: Arc::new(Instant::now()),
        }
    }
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_poll(&self, kind: LoopKind, ok: bool) {
        let counter = match (kind, ok) {
            (LoopKind::Results, true) => &self.results_polls_ok,
            (LoopKind::Results, false) => &self.results_polls_failed,
            (LoopKind::Dashboard, true) => &self.dashboard_polls_ok,
            (LoopKind::Dashboard, false) => &self.dashboard_polls_failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add_feed_lines(&self, lines: u64, results: u64) {
        self.feed_lines.fetch_add(lines, Ordering::SeqCst);
        self.results_received.fetch_add(results, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        let results_ok = self.results_polls_ok.load(Ordering::SeqCst);
        let results_failed = self.results_polls_failed.load(Ordering::SeqCst);
        let dashboard_ok = self.dashboard_polls_ok.load(Ordering::SeqCst);
        let dashboard_failed = self.dashboard_polls_failed.load(Ordering::SeqCst);

        let total = results_ok + results_failed + dashboard_ok + dashboard_failed;
        let success_rate = if total > 0 {
            ((results_ok + dashboard_ok) as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        SyncSnapshot {
            results_polls_ok: results_ok,
            results_polls_failed: results_failed,
            dashboard_polls_ok: dashboard_ok,
            dashboard_polls_failed: dashboard_failed,
            feed_lines: self.feed_lines.load(Ordering::SeqCst),
            results_received: self.results_received.load(Ordering::SeqCst),
            success_rate,
            elapsed_seconds: self.start_time.elapsed().as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_covers_both_loops() {
        let metrics = SyncMetrics::new();
        metrics.record_poll(LoopKind::Results, true);
        metrics.record_poll(LoopKind::Results, false);
        metrics.record_poll(LoopKind::Dashboard, true);
        metrics.record_poll(LoopKind::Dashboard, true);
        metrics.add_feed_lines(3, 1);

        let snap = metrics.snapshot();
        assert_eq!(snap.results_polls_failed, 1);
        assert_eq!(snap.dashboard_polls_ok, 2);
        assert_eq!(snap.feed_lines, 3);
        assert!((snap.success_rate - 75.0).abs() < f64::EPSILON);
    }
}
