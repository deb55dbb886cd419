use crate::api::schema::{DashboardSnapshot, ResultRecord};
use crate::error::Result;
use crate::panel::view::FeedLine;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

pub mod console;
pub mod csv;
pub mod json;

/// Surface the panel renders to. `alert` is the blocking user dialog; the
/// other hooks mirror what the poll loops change in the view.
pub trait Presenter: Send + Sync {
    fn alert(&self, message: &str);

    fn feed_appended(&self, _lines: &[FeedLine]) {}

    fn dashboard_updated(&self, _snapshot: &DashboardSnapshot) {}
}

#[async_trait]
pub trait ExportWriter: Send + Sync {
    async fn write(&mut self, record: &ResultRecord) -> Result<()>;
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// `resultados_<ISO-8601 UTC>.<ext>` with `:` and `.` replaced by `-`.
pub fn export_file_name(extension: &str, now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("resultados_{}.{}", stamp, extension)
}
