pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod output;
pub mod panel;
pub mod sync;

pub use api::ApiClient;
pub use config::{ConfigLoader, PanelConfig};
pub use error::{Error, Result};
pub use metrics::{SyncMetrics, SyncSnapshot};
pub use output::Presenter;
pub use panel::{CommandOutcome, Panel, PanelView, SaveOutcome};
pub use sync::{LoopHealth, LoopKind};
