//! Background synchronization of the panel view with the backend.

pub mod backoff;
pub mod poller;
pub mod tasks;

pub use backoff::backoff_delay;
pub use poller::{PollHandle, PollSchedule, PollTask};
pub use tasks::{DashboardTask, ResultsTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    Results,
    Dashboard,
}

impl LoopKind {
    pub fn name(&self) -> &'static str {
        match self {
            LoopKind::Results => "results",
            LoopKind::Dashboard => "dashboard",
        }
    }

    /// Label used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            LoopKind::Results => "resultados",
            LoopKind::Dashboard => "painel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopHealth {
    Healthy,
    Degraded { consecutive_failures: u32 },
    Stopped,
}
