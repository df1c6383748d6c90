/// API Request Handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::AppState;
use crate::core::{DashboardState, MetricsTransport, Network, TransportError};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg),
        }
    }
}

/// Error body of the metrics proxy, kept flat for dashboard clients
#[derive(Serialize)]
struct ProxyError {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn proxy_error(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Response {
    let body = ProxyError {
        error: error.into(),
        details,
    };
    (status, Json(body)).into_response()
}

#[derive(Deserialize)]
pub struct MetricsQuery {
    network: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    id: &'static str,
    display_name: &'static str,
    configured: bool,
}

// ============================================================================
// Metrics Proxy
// ============================================================================

pub async fn get_metrics(State(state): State<AppState>, Query(query): Query<MetricsQuery>) -> Response {
    let Some(raw) = query.network.filter(|n| !n.is_empty()) else {
        return proxy_error(StatusCode::BAD_REQUEST, "Network parameter is required", None);
    };

    let Ok(network) = raw.parse::<Network>() else {
        return proxy_error(StatusCode::BAD_REQUEST, "Invalid network parameter", None);
    };

    match state.upstream.fetch(network).await {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain"),
                (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            ],
            body,
        )
            .into_response(),
        Err(TransportError::NotConfigured(err)) => {
            warn!(network = %network, "{}", err);
            proxy_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None)
        }
        Err(err) => {
            warn!(network = %network, error = %err, "upstream fetch failed");
            proxy_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching metrics",
                Some(err.to_string()),
            )
        }
    }
}

// ============================================================================
// Dashboard Handlers
// ============================================================================

pub async fn get_dashboard(State(state): State<AppState>) -> Json<ApiResponse<DashboardState>> {
    Json(ApiResponse::ok(state.controller.current()))
}

pub async fn switch_network(
    State(state): State<AppState>,
    Path(network): Path<String>,
) -> Result<Json<ApiResponse<DashboardState>>, (StatusCode, Json<ApiResponse<DashboardState>>)> {
    let network: Network = network.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Invalid network parameter".to_string())),
        )
    })?;

    state.controller.switch_network(network);
    Ok(Json(ApiResponse::ok(state.controller.current())))
}

pub async fn refresh_dashboard(State(state): State<AppState>) -> Json<ApiResponse<DashboardState>> {
    state.controller.refresh().await;
    Json(ApiResponse::ok(state.controller.current()))
}

pub async fn get_networks(State(state): State<AppState>) -> Json<ApiResponse<Vec<NetworkInfo>>> {
    let networks = Network::all()
        .iter()
        .map(|network| NetworkInfo {
            id: network.id(),
            display_name: network.display_name(),
            configured: state.config.is_configured(*network),
        })
        .collect();

    Json(ApiResponse::ok(networks))
}

pub async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::ok("healthy".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BridgeConfig;
    use crate::server::create_router;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    const UPSTREAM_TEXT: &str = "# HELP uptime Uptime of the node\n\
        uptime{version=\"1.30.1\",client_enabled=\"true\"} 3600\n\
        bridge_gas_coin_balance 2500000000\n";

    async fn spawn_upstream(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route("/metrics", get(move || async move { (status, body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/metrics", addr)
    }

    async fn unreachable_upstream() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/metrics", addr)
    }

    fn router_with(mainnet: Option<String>) -> (Router, AppState) {
        let mut config = BridgeConfig::default();
        if let Some(url) = mainnet {
            config.set_upstream(Network::Mainnet, url);
        }
        let state = AppState::new(config).unwrap();
        (create_router(state.clone(), false), state)
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let cache_control = response
            .headers()
            .get(header::CACHE_CONTROL)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, cache_control, String::from_utf8(body.to_vec()).unwrap())
    }

    fn json(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn test_proxy_requires_network() {
        let (app, _) = router_with(None);
        let (status, _, body) = send(app, "GET", "/api/metrics").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body), serde_json::json!({"error": "Network parameter is required"}));
    }

    #[tokio::test]
    async fn test_proxy_rejects_unknown_network() {
        let (app, _) = router_with(None);
        let (status, _, body) = send(app, "GET", "/api/metrics?network=DEVNET_BRIDGE").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body), serde_json::json!({"error": "Invalid network parameter"}));
    }

    #[tokio::test]
    async fn test_proxy_reports_missing_upstream() {
        let (app, _) = router_with(None);
        let (status, _, body) = send(app, "GET", "/api/metrics?network=TESTNET_BRIDGE").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(&body), serde_json::json!({"error": "TESTNET_BRIDGE_URL is not defined"}));
    }

    #[tokio::test]
    async fn test_proxy_forwards_upstream_text() {
        let upstream = spawn_upstream(StatusCode::OK, UPSTREAM_TEXT).await;
        let (app, _) = router_with(Some(upstream));
        let (status, cache_control, body) = send(app, "GET", "/api/metrics?network=MAINNET_BRIDGE").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control.as_deref(), Some("no-cache, no-store, must-revalidate"));
        assert_eq!(body, UPSTREAM_TEXT);
    }

    #[tokio::test]
    async fn test_proxy_wraps_upstream_failure() {
        let upstream = spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, "down").await;
        let (app, _) = router_with(Some(upstream));
        let (status, _, body) = send(app, "GET", "/api/metrics?network=MAINNET_BRIDGE").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = json(&body);
        assert_eq!(body["error"], "Error fetching metrics");
        assert_eq!(body["details"], "HTTP error! status: 503");

        let (app, _) = router_with(Some(unreachable_upstream().await));
        let (status, _, body) = send(app, "GET", "/api/metrics?network=MAINNET_BRIDGE").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json(&body)["error"], "Error fetching metrics");
    }

    #[tokio::test]
    async fn test_refresh_populates_dashboard() {
        let upstream = spawn_upstream(StatusCode::OK, UPSTREAM_TEXT).await;
        let (app, _) = router_with(Some(upstream));

        let (status, _, body) = send(app.clone(), "POST", "/api/dashboard/refresh").await;
        assert_eq!(status, StatusCode::OK);

        let body = json(&body);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["network"], "MAINNET_BRIDGE");
        assert_eq!(body["data"]["snapshot"]["version"], "1.30.1");
        assert_eq!(body["data"]["snapshot"]["client"]["gasCoinBalance"], 2_500_000_000.0);
        assert_eq!(body["data"]["status"]["isOnline"], true);
        assert_eq!(body["data"]["history"].as_array().unwrap().len(), 1);

        let (_, _, body) = send(app, "GET", "/api/dashboard").await;
        assert_eq!(json(&body)["data"]["snapshot"]["uptime"], 3_600_000.0);
    }

    #[tokio::test]
    async fn test_switch_network_endpoint() {
        let (app, state) = router_with(None);

        let (status, _, body) = send(app.clone(), "POST", "/api/dashboard/network/TESTNET_BRIDGE").await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["data"]["network"], "TESTNET_BRIDGE");
        assert!(body["data"]["snapshot"].is_null());
        assert!(state.controller.is_running());

        let (status, _, body) = send(app, "POST", "/api/dashboard/network/nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "Invalid network parameter");

        state.controller.stop();
    }

    #[tokio::test]
    async fn test_networks_and_health() {
        let (app, _) = router_with(Some("http://127.0.0.1:9184/metrics".to_string()));

        let (_, _, body) = send(app.clone(), "GET", "/api/networks").await;
        let body = json(&body);
        assert_eq!(body["data"][0]["id"], "MAINNET_BRIDGE");
        assert_eq!(body["data"][0]["displayName"], "Mainnet Bridge");
        assert_eq!(body["data"][0]["configured"], true);
        assert_eq!(body["data"][1]["configured"], false);

        let (status, _, body) = send(app, "GET", "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["data"], "healthy");
    }
}
