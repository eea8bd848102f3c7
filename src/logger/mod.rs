//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Startup and shutdown lines
//! - Per-request access logging
//! - Error and warning logging

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::ServerConfig;
use writer::LogWriter;

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Startup announcement: listening port, then served directory
fn startup_lines(config: &ServerConfig) -> [String; 2] {
    [
        format!("Server running at http://localhost:{}", config.port),
        format!("Serving files from {}", config.root_dir.display()),
    ]
}

/// Print the startup announcement to the console, even when the access log
/// goes to a file
pub fn log_server_start(config: &ServerConfig) {
    for line in startup_lines(config) {
        println!("{line}");
    }
}

pub fn log_shutdown() {
    write_info("Shutdown signal received, no longer accepting connections");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(writer: &LogWriter, entry: &AccessLogEntry, format: &str) {
    writer.write_access(&entry.format(format));
}
