//! Wire types shared by every endpoint of the control panel backend.
//!
//! One definition per request/response body; the client, the panel and the
//! exporters all go through these types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{Error, Result};

/// Parameters of a search run, built from the panel form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1))]
    pub search_term: String,

    #[validate(length(min = 1))]
    pub cities: Vec<String>,

    #[validate(length(min = 1))]
    pub state: String,

    pub max_pages: u32,
    pub num_threads: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyUpload {
    pub proxies: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRequest {
    pub fields: Vec<String>,
}

/// Reply of the one-shot commands: either a `message` or an `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CommandReply {
    /// `error` wins over `message` when a server sends both.
    pub fn into_result(self) -> Result<String> {
        match (self.error, self.message) {
            (Some(err), _) => Err(Error::Server(err)),
            (None, Some(msg)) => Ok(msg),
            (None, None) => Ok(String::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
    #[default]
    #[serde(other)]
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub message: String,
}

/// One discovered business lead: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord(pub Map<String, Value>);

impl ResultRecord {
    /// Field rendered as text; empty when absent, JSON text when not a string.
    pub fn field(&self, name: &str) -> String {
        match self.0.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// Body of `/get_results`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsBatch {
    pub logs: Vec<LogEntry>,
    pub results: Vec<ResultRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub cities_searched: u64,
    pub top_city: String,
    pub monthly_cnpjs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_log_level_falls_back_to_warning() {
        let entry: LogEntry = serde_json::from_value(json!({
            "timestamp": "10:00",
            "level": "debug",
            "message": "x"
        }))
        .unwrap();
        assert_eq!(entry.level, LogLevel::Warning);

        let entry: LogEntry = serde_json::from_value(json!({ "message": "no level" })).unwrap();
        assert_eq!(entry.level, LogLevel::Warning);
    }

    #[test]
    fn reply_error_takes_precedence() {
        let reply = CommandReply {
            message: Some("ok".into()),
            error: Some("boom".into()),
        };
        assert!(matches!(reply.into_result(), Err(Error::Server(e)) if e == "boom"));
    }

    #[test]
    fn record_field_renders_non_strings() {
        let record: ResultRecord = serde_json::from_value(json!({
            "Título": "Padaria",
            "Nota": 4.5,
            "Email": null
        }))
        .unwrap();
        assert_eq!(record.field("Título"), "Padaria");
        assert_eq!(record.field("Nota"), "4.5");
        assert_eq!(record.field("Email"), "");
        assert_eq!(record.field("CNPJ"), "");
    }

    #[test]
    fn legacy_results_shape_is_rejected() {
        let legacy = json!({ "results": [{ "type": "log", "message": "x" }] });
        assert!(serde_json::from_value::<ResultsBatch>(legacy).is_err());
    }

    #[test]
    fn search_request_requires_term_state_and_cities() {
        let mut req = SearchRequest {
            search_term: "padaria".into(),
            cities: vec!["Maceió".into()],
            state: "AL".into(),
            max_pages: 5,
            num_threads: 5,
        };
        assert!(req.validate().is_ok());

        req.cities.clear();
        assert!(req.validate().is_err());
    }
}
