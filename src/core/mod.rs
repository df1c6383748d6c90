pub mod bridge_metrics;
pub mod clock;
pub mod config;
pub mod exposition;
pub mod history;
pub mod indicators;
pub mod network;
pub mod poller;
pub mod transport;

pub use bridge_metrics::{parse_snapshot, BridgeSnapshot};
pub use clock::{Clock, SystemClock};
pub use config::{BridgeConfig, ConfigError};
pub use history::{HistoricalSnapshot, History};
pub use network::Network;
pub use poller::{CycleOutcome, DashboardState, NetworkStatus, PollerOptions, PollingController};
pub use transport::{HttpTransport, MetricsTransport, ProxyTransport, TransportError};
