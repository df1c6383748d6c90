/// CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use bridge_monitor::core::Network;

// Build timestamp injected at compile time
pub const VERSION_WITH_BUILD: &str = concat!(env!("CARGO_PKG_VERSION"), " (built: ", env!("BUILD_TIMESTAMP"), ")");

#[derive(Parser)]
#[command(name = "bridge-monitor")]
#[command(author, version = VERSION_WITH_BUILD, about = "Sui bridge node metrics dashboard", long_about = None)]
pub struct Cli {
    /// Network to monitor (MAINNET_BRIDGE or TESTNET_BRIDGE)
    #[arg(short, long, global = true)]
    pub network: Option<Network>,

    /// Polling interval, e.g. 30s or 1m
    #[arg(short, long, global = true, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Fetch through a running `bridge-monitor serve` instance instead of the upstream nodes
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    /// Write logs to this file (the dashboard logs nowhere otherwise)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run HTTP server mode (metrics proxy and dashboard API)
    #[cfg(feature = "server")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Enable CORS for cross-origin requests
        #[arg(long)]
        cors: bool,
    },

    /// Poll once and print a summary
    Fetch {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,

        /// Fetch every network concurrently
        #[arg(short, long)]
        all: bool,
    },

    /// Preferences
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Set the network selected at startup
    SetNetwork {
        network: Network,
    },
}
