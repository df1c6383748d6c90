//! Prometheus exposition text extraction
//!
//! Best-effort lookups over the plain-text format served at `/metrics`:
//!
//! ```text
//! # HELP bridge_gas_coin_balance Current balance of gas coin, in mist
//! # TYPE bridge_gas_coin_balance gauge
//! bridge_gas_coin_balance 3992389320
//! bridge_eth_rpc_queries{type="eth_call"} 1024
//! ```
//!
//! Lookups never fail. A missing or malformed line yields the default so a
//! single bad sample cannot take down the whole snapshot.

use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_VERSION: &str = "0.0.0";

/// Version and client flag read from the process info line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub client_enabled: bool,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            client_enabled: false,
        }
    }
}

/// Value of the first line starting with `selector`, or 0.
///
/// `selector` is matched literally and may carry a label fragment such as
/// `bridge_eth_rpc_queries{type="eth_call"}`. The value is the second
/// whitespace-separated token of the line.
pub fn extract_value(text: &str, selector: &str) -> f64 {
    text.lines()
        .find(|line| line.starts_with(selector))
        .map(parse_sample_value)
        .unwrap_or(0.0)
}

/// Sample value of a single exposition line (`name{labels} value [timestamp]`)
fn parse_sample_value(line: &str) -> f64 {
    let value = line
        .split_whitespace()
        .nth(1)
        .and_then(|token| token.parse::<f64>().ok())
        .unwrap_or(0.0);

    // Counters and gauges we read are never negative; NaN/Inf carry no signal
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Read `version="..."` and `client_enabled="..."` from the first sample
/// line mentioning `version`. `# HELP` / `# TYPE` lines are skipped.
pub fn extract_version_info(text: &str) -> VersionInfo {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    static CLIENT_ENABLED_RE: OnceLock<Regex> = OnceLock::new();

    let version_re = VERSION_RE.get_or_init(|| {
        Regex::new(r#"version="([^"]+)""#).unwrap()
    });

    let client_enabled_re = CLIENT_ENABLED_RE.get_or_init(|| {
        Regex::new(r#"client_enabled="(true|false)""#).unwrap()
    });

    let Some(line) = text
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find(|line| line.contains("version"))
    else {
        return VersionInfo::default();
    };

    let version = version_re
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_VERSION.to_string());

    let client_enabled = client_enabled_re
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str() == "true")
        .unwrap_or(false);

    VersionInfo {
        version,
        client_enabled,
    }
}
