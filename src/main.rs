//! # minihttpd - Entry Point
//! src/main.rs
//!
//! Lee la configuración (CLI, entorno y archivo opcional), registra los
//! endpoints de ejemplo y arranca el servidor. Cualquier error de arranque
//! termina el proceso con código 1.

use anyhow::Context;
use tracing::error;

use minihttpd::config::Config;
use minihttpd::{handlers, logging, server};

fn main() {
    let config = Config::new();

    if let Err(err) = logging::init_logging(config.log_format) {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }

    if let Err(err) = run(config) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    let config = config.resolve().context("Configuration error")?;
    config.log_summary();

    let router = handlers::router(&config.www_root);
    server::start(router, &config).context("Server error")
}
