pub mod client;
pub mod schema;

pub use client::ApiClient;
pub use schema::{
    CommandReply, DashboardSnapshot, LogEntry, LogLevel, ResultRecord, ResultsBatch,
    SearchRequest,
};
