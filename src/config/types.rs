// Configuration types module
// Raw layered settings and the resolved, immutable server configuration

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Layered settings as read from defaults, `devserver.toml`, environment and CLI
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Served directory, relative to `base_dir` unless absolute
    pub directory: String,
    /// Overrides the install directory used as the anchor for relative paths
    pub base_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// `default`, `json`, or a custom `$variable` pattern
    pub access_log_format: String,
    pub access_log_file: Option<String>,
    pub error_log_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub index_files: Vec<String>,
    /// `max-age` for static files, in seconds
    pub max_age: u32,
    pub keep_alive: bool,
}

/// Resolved configuration, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub port: u16,
    /// Canonical absolute path of the served directory
    pub root_dir: PathBuf,
    /// Location of the discovery manifest
    pub stages_file: PathBuf,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
}
