//! CLI command implementations

use anyhow::Result;
use std::fs;

use crate::cli::{info, success, warn};
use crate::config::{self, Config};

/// Initialize a new cardforge.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new("cardforge.toml");

    if config_path.exists() {
        warn("cardforge.toml already exists");
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success("Created cardforge.toml");
    info("Set JWT_SECRET and DATABASE_URL, then run 'cardforge serve'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config()?;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    crate::api::run_server(config, &host, port).await?;
    Ok(())
}

fn load_config() -> Result<Config> {
    config::load_config().map_err(Into::into)
}
