//! Command line interface
//!
//! Only `--directory` and `--port` are accepted. Values left unset fall back to
//! `devserver.toml`, `DEVSERVER_*` environment variables, then built-in defaults.

use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about = "Static file server with cross-origin isolation for WebAssembly builds")]
pub struct Cli {
    /// Directory to serve, relative to the server's install directory [default: public]
    #[arg(long)]
    pub directory: Option<String>,

    /// Port to listen on [default: 8080]
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,
}
