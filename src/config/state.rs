// Application state module
// Read-only state shared by every connection

use std::sync::Arc;

use super::types::ServerConfig;
use crate::logger::writer::LogWriter;

/// Application state
pub struct AppState {
    pub config: ServerConfig,
    /// Destination of per-request access log lines
    pub access_log: Arc<LogWriter>,
}

impl AppState {
    pub const fn new(config: ServerConfig, access_log: Arc<LogWriter>) -> Self {
        Self { config, access_log }
    }
}
