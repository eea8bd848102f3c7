// Configuration module entry point
// Loads layered settings and resolves them into the immutable ServerConfig

mod resolve;
mod state;
pub mod types;

use crate::cli::Cli;

// Re-export public types
pub use state::AppState;
pub use types::{ServerConfig, Settings};

/// Optional settings file looked up in the working directory (extension omitted)
pub const CONFIG_FILE: &str = "devserver";

/// Prefix for environment overrides, e.g. `DEVSERVER_LOGGING__ACCESS_LOG=false`
const ENV_PREFIX: &str = "DEVSERVER";

impl Settings {
    /// Load settings from `devserver.toml`, the environment and the command line
    pub fn load(cli: &Cli) -> Result<Self, config::ConfigError> {
        Self::load_from(CONFIG_FILE, cli)
    }

    /// Load settings from specified file path (without extension)
    pub fn load_from(config_path: &str, cli: &Cli) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.directory", "public")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "default")?
            .set_default("http.index_files", vec!["index.html"])?
            .set_default("http.max_age", 0)?
            .set_default("http.keep_alive", true)?
            .set_override_option("server.directory", cli.directory.clone())?
            .set_override_option("server.port", cli.port.map(i64::from))?
            .build()?;

        settings.try_deserialize()
    }
}
