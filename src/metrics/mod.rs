pub mod collector;
pub mod snapshot;

pub use collector::SyncMetrics;
pub use snapshot::SyncSnapshot;
