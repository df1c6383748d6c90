//! Bridge network identifiers
//!
//! The dashboard watches exactly two bridge relay deployments. The
//! identifier strings are shared with the proxy query string and the
//! environment variable names, so they must not change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::{MAINNET_URL_VAR, TESTNET_URL_VAR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    #[serde(rename = "MAINNET_BRIDGE")]
    Mainnet,
    #[serde(rename = "TESTNET_BRIDGE")]
    Testnet,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid network parameter: {0}")]
pub struct UnknownNetwork(pub String);

impl Network {
    pub fn all() -> &'static [Network] {
        &[Network::Mainnet, Network::Testnet]
    }

    /// Wire identifier, e.g. `MAINNET_BRIDGE`
    pub fn id(&self) -> &'static str {
        match self {
            Network::Mainnet => "MAINNET_BRIDGE",
            Network::Testnet => "TESTNET_BRIDGE",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Network::Mainnet => "Mainnet Bridge",
            Network::Testnet => "Testnet Bridge",
        }
    }

    /// Environment variable holding the upstream metrics URL
    pub fn url_var(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_URL_VAR,
            Network::Testnet => TESTNET_URL_VAR,
        }
    }

    /// Cycle to the next network (used by the selector key binding)
    pub fn next(&self) -> Network {
        match self {
            Network::Mainnet => Network::Testnet,
            Network::Testnet => Network::Mainnet,
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Mainnet
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "MAINNET_BRIDGE" => Ok(Network::Mainnet),
            "TESTNET_BRIDGE" => Ok(Network::Testnet),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}
