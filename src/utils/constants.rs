//! Bridge monitor defaults and environment variable names

use std::time::Duration;

/// Seconds between scheduled polls
pub const REFRESH_INTERVAL_SECS: u64 = 30;
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(REFRESH_INTERVAL_SECS);

/// Upstream request timeout
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Snapshots kept for trend charts
pub const MAX_HISTORICAL_POINTS: usize = 30;

/// 1 SUI = 10^9 MIST
pub const MIST_PER_SUI: f64 = 1_000_000_000.0;

// Environment variables (also read from .env)
pub const MAINNET_URL_VAR: &str = "MAINNET_BRIDGE_URL";
pub const TESTNET_URL_VAR: &str = "TESTNET_BRIDGE_URL";
pub const DEFAULT_NETWORK_VAR: &str = "DEFAULT_NETWORK";
pub const REFRESH_INTERVAL_VAR: &str = "REFRESH_INTERVAL_SECS";
pub const REQUEST_TIMEOUT_VAR: &str = "REQUEST_TIMEOUT_SECS";

/// Default tracing filter when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "bridge_monitor=info,tower_http=info";

/// Directory name under the user's config dir
pub const APP_DIR_NAME: &str = "bridge-monitor";
