// Configuration resolver
// Turns layered settings into a ServerConfig, failing fast on a missing directory

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use super::types::{ServerConfig, Settings};
use crate::error::ConfigError;

/// Discovery manifest name, looked up in the install directory
pub const STAGES_FILE: &str = "stages.json";

/// Install directory baked in at build time, used when `server.base_dir` is unset
fn default_base_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

impl ServerConfig {
    /// Resolve settings against the install directory.
    ///
    /// Fails if the served directory is missing or not a directory. Must run
    /// before any socket is bound.
    pub fn resolve(settings: Settings) -> Result<Self, ConfigError> {
        let base_dir = settings
            .server
            .base_dir
            .as_deref()
            .map_or_else(default_base_dir, PathBuf::from);

        if settings.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        let addr_str = format!("{}:{}", settings.server.host, settings.server.port);
        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|source| ConfigError::InvalidAddress {
                addr: addr_str.clone(),
                source,
            })?;

        let root_dir = resolve_root_dir(&base_dir, &settings.server.directory)?;

        Ok(Self {
            addr,
            port: settings.server.port,
            root_dir,
            stages_file: base_dir.join(STAGES_FILE),
            logging: settings.logging,
            http: settings.http,
        })
    }
}

/// Join `directory` onto `base_dir` and canonicalize it
fn resolve_root_dir(base_dir: &Path, directory: &str) -> Result<PathBuf, ConfigError> {
    // An absolute `directory` replaces `base_dir` entirely
    let candidate = base_dir.join(directory);

    let metadata = match std::fs::metadata(&candidate) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::DirectoryNotFound(candidate));
        }
        Err(source) => {
            return Err(ConfigError::Inaccessible {
                path: candidate,
                source,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(ConfigError::NotADirectory(candidate));
    }

    candidate
        .canonicalize()
        .map_err(|source| ConfigError::Inaccessible {
            path: candidate,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::types::{HttpConfig, LoggingConfig, ServerSettings};
    use std::fs;
    use tempfile::tempdir;

    fn settings(base: &Path, directory: &str, port: u16) -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port,
                directory: directory.to_string(),
                base_dir: Some(base.to_string_lossy().into_owned()),
            },
            logging: LoggingConfig {
                access_log: true,
                access_log_format: "default".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            http: HttpConfig {
                index_files: vec!["index.html".to_string()],
                max_age: 0,
                keep_alive: true,
            },
        }
    }

    #[test]
    fn test_relative_directory_is_anchored_at_base_dir() {
        let base = tempdir().unwrap();
        fs::create_dir(base.path().join("public")).unwrap();

        let config = ServerConfig::resolve(settings(base.path(), "public", 8080)).unwrap();
        assert!(config.root_dir.is_absolute());
        assert_eq!(
            config.root_dir,
            base.path().join("public").canonicalize().unwrap()
        );
        assert_eq!(config.stages_file, base.path().join(STAGES_FILE));
        assert_eq!(config.port, 8080);
        assert_eq!(config.addr.port(), 8080);
    }

    #[test]
    fn test_absolute_directory_is_kept() {
        let base = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        let dir = elsewhere.path().to_string_lossy().into_owned();

        let config = ServerConfig::resolve(settings(base.path(), &dir, 8080)).unwrap();
        assert_eq!(config.root_dir, elsewhere.path().canonicalize().unwrap());
    }

    #[test]
    fn test_missing_directory_fails() {
        let base = tempdir().unwrap();
        let err = ServerConfig::resolve(settings(base.path(), "nope", 8080)).unwrap_err();
        assert!(matches!(err, ConfigError::DirectoryNotFound(ref p) if p.ends_with("nope")));
    }

    #[test]
    fn test_file_instead_of_directory_fails() {
        let base = tempdir().unwrap();
        fs::write(base.path().join("public"), b"not a dir").unwrap();
        let err = ServerConfig::resolve(settings(base.path(), "public", 8080)).unwrap_err();
        assert!(matches!(err, ConfigError::NotADirectory(_)));
    }

    #[test]
    fn test_zero_port_fails() {
        let base = tempdir().unwrap();
        fs::create_dir(base.path().join("public")).unwrap();
        let err = ServerConfig::resolve(settings(base.path(), "public", 0)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn test_bad_host_fails() {
        let base = tempdir().unwrap();
        fs::create_dir(base.path().join("public")).unwrap();
        let mut s = settings(base.path(), "public", 8080);
        s.server.host = "not a host".to_string();
        let err = ServerConfig::resolve(s).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress { .. }));
    }
}
