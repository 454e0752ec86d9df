//! CLI interface for Cardforge

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cardforge")]
#[command(version = "1.0.0")]
#[command(about = "Trading card catalog and community events backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new cardforge.toml configuration file
    Init,

    /// Start the HTTP API server
    Serve {
        /// Bind address, overrides the configured host
        #[arg(long)]
        host: Option<String>,

        /// Bind port, overrides the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
}
