//! Log writer module
//!
//! Provides thread-safe log writing to files or stdout/stderr. Each message is
//! written as one whole line while the target lock is held, so lines from
//! concurrent requests never interleave.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<Arc<LogWriter>> = OnceLock::new();

/// Log output target
enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Write to file
    File(File),
    /// Keep lines in memory
    #[cfg(test)]
    Memory(Vec<String>),
}

/// Thread-safe log writer
pub struct LogWriter {
    /// Access log target
    access: Mutex<LogTarget>,
    /// Error log target
    error: Mutex<LogTarget>,
}

impl LogWriter {
    /// Create a new log writer with optional file paths
    pub fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        let access = match access_log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stdout,
        };

        let error = match error_log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stderr,
        };

        Ok(Self {
            access: Mutex::new(access),
            error: Mutex::new(error),
        })
    }

    /// Writer that records lines in memory, for assertions in tests
    #[cfg(test)]
    pub const fn in_memory() -> Self {
        Self {
            access: Mutex::new(LogTarget::Memory(Vec::new())),
            error: Mutex::new(LogTarget::Memory(Vec::new())),
        }
    }

    /// Lines recorded on the access target of an in-memory writer
    #[cfg(test)]
    pub fn access_lines(&self) -> Vec<String> {
        match &*self.access.lock().unwrap() {
            LogTarget::Memory(lines) => lines.clone(),
            _ => Vec::new(),
        }
    }

    /// Write to access log
    pub fn write_access(&self, message: &str) {
        write_locked(&self.access, message);
    }

    /// Write info message (to access log target)
    pub fn write_info(&self, message: &str) {
        write_locked(&self.access, message);
    }

    /// Write to error log
    pub fn write_error(&self, message: &str) {
        write_locked(&self.error, message);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

fn write_locked(target: &Mutex<LogTarget>, message: &str) {
    // A poisoned lock still guards a usable target
    let mut guard = match target.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    write_to_target(&mut guard, message);
}

/// Write message to log target
fn write_to_target(target: &mut LogTarget, message: &str) {
    match target {
        LogTarget::Stdout => {
            println!("{message}");
        }
        LogTarget::Stderr => {
            eprintln!("{message}");
        }
        LogTarget::File(f) => {
            let _ = writeln!(f, "{message}");
        }
        #[cfg(test)]
        LogTarget::Memory(lines) => lines.push(message.to_string()),
    }
}

/// Install the global log writer
///
/// This should be called once at application startup.
pub fn install(writer: Arc<LogWriter>) -> io::Result<()> {
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if installed
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get().map(AsRef::as_ref)
}
