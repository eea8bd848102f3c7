use clap::Parser;
use std::sync::Arc;

mod cli;
mod config;
mod error;
mod handler;
mod http;
mod logger;
mod middleware;
mod server;

use crate::logger::writer::{self, LogWriter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli::Cli::parse();

    // Everything that can fail at startup is resolved before a socket exists
    let settings = config::Settings::load(&cli)?;
    let server_config = config::ServerConfig::resolve(settings)?;

    let log = Arc::new(LogWriter::new(
        server_config.logging.access_log_file.as_deref(),
        server_config.logging.error_log_file.as_deref(),
    )?);
    writer::install(Arc::clone(&log))?;

    // One thread multiplexes every connection
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(server_config, log))
}

async fn async_main(
    server_config: config::ServerConfig,
    log: Arc<LogWriter>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = server::create_listener(server_config.addr)?;

    logger::log_server_start(&server_config);
    let state = Arc::new(config::AppState::new(server_config, log));

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::run_server_loop(
            listener,
            state,
            server::shutdown_signal(),
        ))
        .await?;

    Ok(())
}
