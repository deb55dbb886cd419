//! In-memory state of the control panel: form inputs, checklists, the live
//! feed and the dashboard counters.

use crate::api::schema::{
    DashboardSnapshot, LogEntry, LogLevel, ResultRecord, ResultsBatch, SearchRequest,
};
use crate::config::SearchDefaults;
use serde::{Deserialize, Serialize};

/// Fields the backend knows how to export, in display order.
pub const EXPORT_FIELDS: [&str; 15] = [
    "Título",
    "URL",
    "CNPJ",
    "Telefone",
    "Email",
    "Localização",
    "Website",
    "WhatsApp",
    "Google Meu Negócio",
    "LinkedIn",
    "Instagram",
    "Situação Cadastral",
    "Nome dos Sócios",
    "Data de Abertura",
    "Inscrição Estadual",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkbox {
    pub value: String,
    pub checked: bool,
}

impl Checkbox {
    pub fn new(value: impl Into<String>, checked: bool) -> Self {
        Self {
            value: value.into(),
            checked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedColor {
    Green,
    Red,
    Yellow,
}

impl From<LogLevel> for FeedColor {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Info => FeedColor::Green,
            LogLevel::Error => FeedColor::Red,
            LogLevel::Warning => FeedColor::Yellow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Log(LogLevel),
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLine {
    pub kind: FeedKind,
    pub text: String,
}

impl FeedLine {
    pub fn from_log(entry: &LogEntry) -> Self {
        Self {
            kind: FeedKind::Log(entry.level),
            text: format!("[{}] {}", entry.timestamp, entry.message),
        }
    }

    pub fn from_result(record: &ResultRecord) -> Self {
        Self {
            kind: FeedKind::Result,
            text: format!(
                "Encontrado: {} - {} (CNPJ: {})",
                record.field("Título"),
                record.field("URL"),
                record.field("CNPJ")
            ),
        }
    }

    pub fn color(&self) -> FeedColor {
        match self.kind {
            FeedKind::Log(level) => level.into(),
            FeedKind::Result => FeedColor::Green,
        }
    }
}

/// Append-only log/result feed with a scroll position.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    lines: Vec<FeedLine>,
    scroll: usize,
}

impl Feed {
    pub fn lines(&self) -> &[FeedLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn scroll_position(&self) -> usize {
        self.scroll
    }

    pub fn max_scroll(&self) -> usize {
        self.lines.len()
    }

    pub fn scroll_to(&mut self, position: usize) {
        self.scroll = position.min(self.max_scroll());
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    /// Appends logs first, then results, in response order. Returns the new lines.
    pub fn append_batch(&mut self, batch: &ResultsBatch) -> &[FeedLine] {
        let start = self.lines.len();
        self.lines.extend(batch.logs.iter().map(FeedLine::from_log));
        self.lines.extend(batch.results.iter().map(FeedLine::from_result));
        self.scroll_to_bottom();
        &self.lines[start..]
    }
}

#[derive(Debug, Clone)]
pub struct PanelView {
    pub search_term: String,
    /// State codes offered by the backend, in server order.
    pub states: Vec<String>,
    pub state: String,
    pub cities: Vec<Checkbox>,
    pub max_pages: u32,
    pub num_threads: u32,
    pub proxies: String,
    pub export_fields: Vec<Checkbox>,
    pub modal_open: bool,
    pub feed: Feed,
    pub dashboard: DashboardSnapshot,
    /// Bumped on every city reload; stale responses carry an older value.
    pub(crate) cities_generation: u64,
}

impl Default for PanelView {
    fn default() -> Self {
        Self::new(SearchDefaults::default())
    }
}

impl PanelView {
    pub fn new(defaults: SearchDefaults) -> Self {
        Self {
            search_term: String::new(),
            states: Vec::new(),
            state: String::new(),
            cities: Vec::new(),
            max_pages: defaults.max_pages,
            num_threads: defaults.num_threads,
            proxies: String::new(),
            export_fields: Vec::new(),
            modal_open: false,
            feed: Feed::default(),
            dashboard: DashboardSnapshot::default(),
            cities_generation: 0,
        }
    }

    pub fn set_city_checked(&mut self, name: &str, checked: bool) -> bool {
        set_checked(&mut self.cities, name, checked)
    }

    pub fn set_field_checked(&mut self, name: &str, checked: bool) -> bool {
        set_checked(&mut self.export_fields, name, checked)
    }

    pub fn checked_cities(&self) -> Vec<String> {
        checked_values(&self.cities)
    }

    pub fn checked_fields(&self) -> Vec<String> {
        checked_values(&self.export_fields)
    }

    pub fn search_request(&self) -> SearchRequest {
        SearchRequest {
            search_term: self.search_term.clone(),
            cities: self.checked_cities(),
            state: self.state.clone(),
            max_pages: self.max_pages,
            num_threads: self.num_threads,
        }
    }

    pub(crate) fn replace_cities(&mut self, cities: Vec<String>) {
        self.cities = cities.into_iter().map(|c| Checkbox::new(c, false)).collect();
    }

    pub(crate) fn open_export_fields(&mut self) {
        self.export_fields = EXPORT_FIELDS.iter().map(|f| Checkbox::new(*f, true)).collect();
        self.modal_open = true;
    }

    pub(crate) fn apply_dashboard(&mut self, snapshot: DashboardSnapshot) {
        self.dashboard = snapshot;
    }
}

fn set_checked(boxes: &mut [Checkbox], name: &str, checked: bool) -> bool {
    match boxes.iter_mut().find(|b| b.value == name) {
        Some(b) => {
            b.checked = checked;
            true
        }
        None => false,
    }
}

fn checked_values(boxes: &[Checkbox]) -> Vec<String> {
    boxes
        .iter()
        .filter(|b| b.checked)
        .map(|b| b.value.clone())
        .collect()
}
