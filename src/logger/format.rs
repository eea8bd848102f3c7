//! Access log format module
//!
//! Supports several formats:
//! - `default`: `[<ISO-8601>] <METHOD> <path>`
//! - `json`: one JSON object per line
//! - Custom patterns with variables

use chrono::{DateTime, SecondsFormat, Utc};
use std::net::SocketAddr;

use crate::handler::RequestContext;

/// Access log entry, captured before the request is routed
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client address, if known
    pub remote_addr: Option<SocketAddr>,
    /// Request timestamp
    pub time: DateTime<Utc>,
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request URI path
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(method: String, path: String) -> Self {
        Self {
            remote_addr: None,
            time: Utc::now(),
            method,
            path,
            query: None,
        }
    }

    pub fn from_context(ctx: &RequestContext<'_>) -> Self {
        Self {
            remote_addr: ctx.remote_addr,
            query: ctx.query.map(ToString::to_string),
            ..Self::new(ctx.method.to_string(), ctx.path.to_string())
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "default" => self.format_default(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    /// ISO-8601 UTC timestamp with millisecond precision, e.g. `2024-01-01T12:00:00.000Z`
    fn time_iso8601(&self) -> String {
        self.time.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn format_default(&self) -> String {
        format!("[{}] {} {}", self.time_iso8601(), self.method, self.path)
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "time": self.time_iso8601(),
            "remote_addr": self.remote_addr.map(|a| a.to_string()),
            "method": self.method,
            "path": self.path,
            "query": self.query,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$remote_addr` - Client address, `-` when unknown
    /// - `$time_iso8601` - ISO 8601 timestamp
    /// - `$request_method` - HTTP method
    /// - `$request_uri` - Request path with query string
    /// - `$path` - Request path only
    fn format_custom(&self, pattern: &str) -> String {
        let remote_addr = self
            .remote_addr
            .map_or_else(|| "-".to_string(), |a| a.to_string());

        pattern
            .replace("$remote_addr", &remote_addr)
            .replace("$time_iso8601", &self.time_iso8601())
            .replace("$request_method", &self.method)
            .replace("$request_uri", &self.request_uri())
            .replace("$path", &self.path)
    }
}
