mod app;
mod cli;
mod screens;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use futures::future::join_all;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use app::App;
use bridge_monitor::core::indicators::{active_errors, format_uptime, overall_cache_hit_ratio};
use bridge_monitor::core::{
    BridgeConfig, CycleOutcome, DashboardState, HttpTransport, MetricsTransport, Network,
    PollerOptions, PollingController, ProxyTransport,
};
use bridge_monitor::utils::{
    format_count, format_percent, format_sui, format_time, humanize_key, AppConfig,
    DEFAULT_LOG_FILTER,
};
use cli::{Cli, Commands, ConfigCommands};

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // The dashboard owns the terminal, so it only logs when asked to
    let log_to_stderr = cli.command.is_some();
    init_tracing(cli.log_file.as_deref(), log_to_stderr)?;

    let prefs = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable preferences file");
        AppConfig::default()
    });
    let config = resolve_config(&cli, &prefs)?;

    match cli.command.take() {
        None => {
            let controller = build_controller(&cli, &config)?;
            let mut app = App::new(controller, config.default_network);
            app.run().await?;
        }
        #[cfg(feature = "server")]
        Some(Commands::Serve { port, host, cors }) => {
            bridge_monitor::server::run(host, port, cors, config).await?;
        }
        Some(Commands::Fetch { json, all }) => {
            let networks = if all {
                Network::all().to_vec()
            } else {
                vec![config.default_network]
            };
            let transport = build_transport(&cli, &config)?;
            handle_fetch(transport, networks, json).await?;
        }
        Some(Commands::Config { command }) => {
            handle_config(command, &config, prefs)?;
        }
    }

    Ok(())
}

fn init_tracing(log_file: Option<&Path>, to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if to_stderr {
        tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}

/// Environment and preferences, then CLI flags on top
fn resolve_config(cli: &Cli, prefs: &AppConfig) -> Result<BridgeConfig> {
    let mut config = BridgeConfig::from_env(prefs).context("Invalid configuration")?;

    if let Some(network) = cli.network {
        config.default_network = network;
    }

    if let Some(interval) = cli.interval {
        if interval.is_zero() {
            bail!("--interval must be greater than zero");
        }
        config.refresh_interval = interval;
    }

    Ok(config)
}

fn build_transport(cli: &Cli, config: &BridgeConfig) -> Result<Arc<dyn MetricsTransport>> {
    let transport: Arc<dyn MetricsTransport> = match &cli.proxy {
        Some(base_url) => Arc::new(ProxyTransport::new(base_url.as_str(), config.request_timeout)?),
        None => Arc::new(HttpTransport::new(Arc::new(config.clone()))?),
    };
    Ok(transport)
}

fn build_controller(cli: &Cli, config: &BridgeConfig) -> Result<PollingController> {
    let transport = build_transport(cli, config)?;
    Ok(PollingController::new(
        transport,
        config.default_network,
        PollerOptions {
            interval: config.refresh_interval,
            ..Default::default()
        },
    ))
}

async fn handle_fetch(transport: Arc<dyn MetricsTransport>, networks: Vec<Network>, json: bool) -> Result<()> {
    let controllers: Vec<PollingController> = networks
        .iter()
        .map(|network| PollingController::new(Arc::clone(&transport), *network, PollerOptions::default()))
        .collect();

    let outcomes = join_all(controllers.iter().map(PollingController::refresh)).await;
    let states: Vec<DashboardState> = controllers.iter().map(PollingController::current).collect();

    if json {
        let output = match states.as_slice() {
            [single] => serde_json::to_string_pretty(single)?,
            many => serde_json::to_string_pretty(many)?,
        };
        println!("{}", output);
    } else {
        for state in &states {
            print_summary(state);
        }
    }

    let failed = outcomes.iter().filter(|o| **o != CycleOutcome::Succeeded).count();
    if failed > 0 {
        bail!("{} of {} network(s) could not be fetched", failed, outcomes.len());
    }

    Ok(())
}

fn print_summary(state: &DashboardState) {
    println!("{}", state.network.display_name().bold());

    let Some(snapshot) = state.snapshot.as_ref() else {
        println!("  {} {}", "OFFLINE".red().bold(), state.error.as_deref().unwrap_or("no data"));
        println!();
        return;
    };

    println!(
        "  {} ({}ms)",
        "ONLINE".green().bold(),
        state.status.response_time_ms
    );
    println!("  {:<18} {}", "Status:", snapshot.status);
    println!(
        "  {:<18} {} (client {})",
        "Version:",
        snapshot.version,
        if snapshot.client_enabled { "enabled" } else { "disabled" }
    );
    println!("  {:<18} {}", "Uptime:", format_uptime(snapshot.uptime_ms));
    println!("  {:<18} {}", "Gas balance:", format_sui(snapshot.client.gas_coin_balance).as_str().yellow());
    println!(
        "  {:<18} {}",
        "Cache hit ratio:",
        format_percent(overall_cache_hit_ratio(&snapshot.cache))
    );
    println!(
        "  {:<18} {}",
        "Last ETH block:",
        format_count(snapshot.client.last_finalized_eth_block)
    );

    let errors = active_errors(&snapshot.errors);
    if errors.is_empty() {
        println!("  {:<18} {}", "Errors:", "none".green());
    } else {
        for (key, count) in errors {
            println!("  {:<18} {}", humanize_key(key).as_str().red(), format_count(count));
        }
    }

    if let Some(updated) = state.last_updated {
        println!("  {:<18} {}", "Fetched at:", format_time(updated));
    }
    println!();
}

fn handle_config(command: ConfigCommands, config: &BridgeConfig, mut prefs: AppConfig) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("{}", "Bridge Monitor Configuration".bold());
            println!();
            for network in Network::all() {
                let url = config
                    .upstream_url(*network)
                    .map(str::to_string)
                    .unwrap_or_else(|_| "(not set)".dimmed().to_string());
                println!("  {:<22} {}", network.url_var(), url);
            }
            println!("  {:<22} {}", "Default network", config.default_network);
            println!(
                "  {:<22} {}",
                "Refresh interval",
                humantime::format_duration(config.refresh_interval)
            );
            println!(
                "  {:<22} {}",
                "Request timeout",
                humantime::format_duration(config.request_timeout)
            );
            println!();
            println!("  Preferences: {}", AppConfig::config_path()?.display());
        }
        ConfigCommands::SetNetwork { network } => {
            prefs.set_default_network(network)?;
            println!("{} Default network set to {}", "✓".green(), network.display_name());
        }
    }

    Ok(())
}
