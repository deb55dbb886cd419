use super::Presenter;
use crate::api::schema::DashboardSnapshot;
use crate::panel::view::{FeedColor, FeedLine};
use console::style;
use indicatif::{MultiProgress, ProgressBar};
use std::sync::Arc;

/// Terminal rendering: alerts and feed lines go to stdout (through the
/// progress bars when they are drawn), dashboard counters to the spinner.
pub struct ConsolePresenter {
    multi: Option<Arc<MultiProgress>>,
    status: Option<ProgressBar>,
}

impl ConsolePresenter {
    pub fn new(multi: Option<Arc<MultiProgress>>) -> Self {
        Self { multi, status: None }
    }

    pub fn with_status(mut self, status: ProgressBar) -> Self {
        self.status = Some(status);
        self
    }

    /// The bars only take our output while they are visible; a hidden
    /// `MultiProgress` accepts `println` and drops the line.
    fn bars(&self) -> Option<&MultiProgress> {
        self.multi.as_deref().filter(|multi| !multi.is_hidden())
    }

    fn println(&self, line: &str) {
        if let Some(multi) = self.bars() {
            if multi.println(line).is_ok() {
                return;
            }
        }
        println!("{}", line);
    }

    fn paint(&self, line: &FeedLine) -> String {
        let text = style(&line.text);
        match line.color() {
            FeedColor::Green => text.green(),
            FeedColor::Red => text.red(),
            FeedColor::Yellow => text.yellow(),
        }
        .to_string()
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Presenter for ConsolePresenter {
    fn alert(&self, message: &str) {
        self.println(&format!("» {}", message));
    }

    fn feed_appended(&self, lines: &[FeedLine]) {
        for line in lines {
            self.println(&self.paint(line));
        }
    }

    fn dashboard_updated(&self, snapshot: &DashboardSnapshot) {
        if let Some(status) = &self.status {
            status.set_message(format_dashboard(snapshot));
        }
    }
}

pub fn format_dashboard(snapshot: &DashboardSnapshot) -> String {
    format!(
        "Cidades pesquisadas: {} | Cidade destaque: {} | CNPJs no mês: {}",
        snapshot.cities_searched, snapshot.top_city, snapshot.monthly_cnpjs
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::schema::{LogEntry, LogLevel};
    use indicatif::ProgressDrawTarget;

    #[test]
    fn hidden_bars_fall_back_to_stdout() {
        let hidden = Arc::new(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()));
        let presenter = ConsolePresenter::new(Some(hidden));
        assert!(presenter.bars().is_none());
        assert!(ConsolePresenter::default().bars().is_none());
    }

    #[test]
    fn feed_lines_keep_their_text_when_painted() {
        let line = FeedLine::from_log(&LogEntry {
            timestamp: "10:00:00".into(),
            message: "Proxy falhou".into(),
            level: LogLevel::Error,
        });
        let painted = ConsolePresenter::default().paint(&line);
        assert_eq!(console::strip_ansi_codes(&painted), line.text);
    }
}
