/// HTTP server: metrics proxy plus a JSON view of the dashboard session

pub mod handlers;
pub mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::core::{BridgeConfig, HttpTransport, PollerOptions, PollingController, TransportError};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BridgeConfig>,
    pub upstream: Arc<HttpTransport>,
    pub controller: PollingController,
}

impl AppState {
    /// Build state with an idle controller on the configured default network
    pub fn new(config: BridgeConfig) -> Result<Self, TransportError> {
        let config = Arc::new(config);
        let upstream = Arc::new(HttpTransport::new(Arc::clone(&config))?);
        let controller = PollingController::new(
            upstream.clone(),
            config.default_network,
            PollerOptions {
                interval: config.refresh_interval,
                ..Default::default()
            },
        );

        Ok(Self {
            config,
            upstream,
            controller,
        })
    }
}

pub async fn run(host: String, port: u16, enable_cors: bool, config: BridgeConfig) -> anyhow::Result<()> {
    let state = AppState::new(config)?;
    let controller = state.controller.clone();
    controller.start(state.config.default_network);

    let app = create_router(state.clone(), enable_cors);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("🌉 Sui Bridge Monitor");
    println!("   🔌 API:     http://{}/api", addr);
    println!("   📡 Network: {}", controller.network().display_name());
    println!();
    println!("📚 API Endpoints:");
    println!("   GET  /api/metrics?network=<ID>        - Raw metrics proxy");
    println!("   GET  /api/dashboard                   - Current dashboard state");
    println!("   POST /api/dashboard/network/:network  - Switch network");
    println!("   POST /api/dashboard/refresh           - Poll now");
    println!("   GET  /api/networks                    - Known networks");
    println!("   GET  /api/health                      - Health check");
    println!();

    for network in crate::core::Network::all() {
        if !state.config.is_configured(*network) {
            println!("   ⚠️  {} is not set, {} is unavailable", network.url_var(), network.display_name());
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    controller.stop();
    info!("server stopped");

    Ok(())
}
