//! Runtime configuration for the bridge monitor
//!
//! Values come from the process environment (after loading `.env`), then the
//! user preferences file, then built-in defaults. CLI flags are applied on
//! top by the binary.

use std::collections::HashMap;
use std::time::Duration;

use super::network::Network;
use crate::utils::{
    AppConfig, DEFAULT_NETWORK_VAR, REFRESH_INTERVAL_SECS, REFRESH_INTERVAL_VAR,
    REQUEST_TIMEOUT_SECS, REQUEST_TIMEOUT_VAR,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No upstream URL configured for the requested network
    #[error("{var} is not defined")]
    MissingUpstream { network: Network, var: &'static str },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    upstreams: HashMap<Network, String>,
    pub default_network: Network,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            upstreams: HashMap::new(),
            default_network: Network::default(),
            refresh_interval: Duration::from_secs(REFRESH_INTERVAL_SECS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl BridgeConfig {
    /// Load from `.env` / the process environment, falling back to `prefs`
    pub fn from_env(prefs: &AppConfig) -> Result<Self, ConfigError> {
        // A missing .env is fine; the variables may come from the shell
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok(), prefs)
    }

    /// Build from an arbitrary key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F, prefs: &AppConfig) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        for network in Network::all() {
            if let Some(url) = lookup(network.url_var()).filter(|u| !u.trim().is_empty()) {
                config.upstreams.insert(*network, url.trim().to_string());
            }
        }

        config.default_network = match lookup(DEFAULT_NETWORK_VAR) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: DEFAULT_NETWORK_VAR,
                value,
            })?,
            None => prefs.default_network.unwrap_or_default(),
        };

        let refresh_secs = match lookup(REFRESH_INTERVAL_VAR) {
            Some(value) => parse_secs(REFRESH_INTERVAL_VAR, value)?,
            None => match prefs.refresh_interval_secs {
                Some(0) => {
                    return Err(ConfigError::InvalidValue {
                        key: REFRESH_INTERVAL_VAR,
                        value: "0".to_string(),
                    })
                }
                Some(secs) => secs,
                None => REFRESH_INTERVAL_SECS,
            },
        };
        config.refresh_interval = Duration::from_secs(refresh_secs);

        if let Some(value) = lookup(REQUEST_TIMEOUT_VAR) {
            config.request_timeout = Duration::from_secs(parse_secs(REQUEST_TIMEOUT_VAR, value)?);
        }

        Ok(config)
    }

    /// Upstream metrics URL for `network`
    pub fn upstream_url(&self, network: Network) -> Result<&str, ConfigError> {
        self.upstreams
            .get(&network)
            .map(String::as_str)
            .ok_or(ConfigError::MissingUpstream {
                network,
                var: network.url_var(),
            })
    }

    pub fn is_configured(&self, network: Network) -> bool {
        self.upstreams.contains_key(&network)
    }

    pub fn set_upstream(&mut self, network: Network, url: impl Into<String>) {
        self.upstreams.insert(network, url.into());
    }
}

fn parse_secs(key: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = BridgeConfig::from_lookup(|_| None, &AppConfig::default()).unwrap();
        assert_eq!(config.default_network, Network::Mainnet);
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!config.is_configured(Network::Mainnet));
    }

    #[test]
    fn test_reads_upstreams_and_overrides() {
        let lookup = lookup_from(&[
            ("MAINNET_BRIDGE_URL", "http://10.0.0.1:9184/metrics"),
            ("TESTNET_BRIDGE_URL", " http://10.0.0.2:9184/metrics "),
            ("DEFAULT_NETWORK", "TESTNET_BRIDGE"),
            ("REFRESH_INTERVAL_SECS", "5"),
        ]);
        let config = BridgeConfig::from_lookup(lookup, &AppConfig::default()).unwrap();

        assert_eq!(config.upstream_url(Network::Mainnet).unwrap(), "http://10.0.0.1:9184/metrics");
        assert_eq!(config.upstream_url(Network::Testnet).unwrap(), "http://10.0.0.2:9184/metrics");
        assert_eq!(config.default_network, Network::Testnet);
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_upstream_error_names_variable() {
        let config = BridgeConfig::from_lookup(
            lookup_from(&[("MAINNET_BRIDGE_URL", "")]),
            &AppConfig::default(),
        )
        .unwrap();

        let err = config.upstream_url(Network::Mainnet).unwrap_err();
        assert_eq!(err.to_string(), "MAINNET_BRIDGE_URL is not defined");
    }

    #[test]
    fn test_preferences_apply_when_env_is_silent() {
        let prefs = AppConfig {
            default_network: Some(Network::Testnet),
            refresh_interval_secs: Some(60),
        };
        let config = BridgeConfig::from_lookup(|_| None, &prefs).unwrap();
        assert_eq!(config.default_network, Network::Testnet);
        assert_eq!(config.refresh_interval, Duration::from_secs(60));

        let config =
            BridgeConfig::from_lookup(lookup_from(&[("DEFAULT_NETWORK", "MAINNET_BRIDGE")]), &prefs)
                .unwrap();
        assert_eq!(config.default_network, Network::Mainnet);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let prefs = AppConfig::default();

        let err = BridgeConfig::from_lookup(lookup_from(&[("DEFAULT_NETWORK", "DEVNET")]), &prefs)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "DEFAULT_NETWORK", .. }));

        assert!(BridgeConfig::from_lookup(lookup_from(&[("REFRESH_INTERVAL_SECS", "0")]), &prefs).is_err());
        assert!(BridgeConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT_SECS", "soon")]), &prefs).is_err());
    }
}
