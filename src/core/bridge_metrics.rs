//! Sui bridge relay metrics snapshot
//!
//! Parses the fixed set of bridge node metrics out of Prometheus exposition
//! text. The selector strings below are the wire contract with the bridge
//! node exporter and have to match it byte for byte.

use serde::{Deserialize, Serialize};

use super::exposition::{extract_value, extract_version_info};

/// Placeholder health label; not derived from the metrics themselves
pub const STATUS_ACTIVE: &str = "Active";

const UPTIME: &str = "uptime";

const ETH_BLOCK_NUMBER: &str = r#"bridge_eth_rpc_queries{type="eth_blockNumber"}"#;
const ETH_CALL: &str = r#"bridge_eth_rpc_queries{type="eth_call"}"#;
const ETH_CHAIN_ID: &str = r#"bridge_eth_rpc_queries{type="eth_chainId"}"#;
const ETH_GET_BLOCK_BY_NUMBER: &str = r#"bridge_eth_rpc_queries{type="eth_getBlockByNumber"}"#;
const ETH_GET_TRANSACTION_RECEIPT: &str =
    r#"bridge_eth_rpc_queries{type="eth_getTransactionReceipt"}"#;

const SUI_ADD_TOKENS_RECEIVED: &str = r#"bridge_requests_received{type="handle_add_tokens_on_sui"}"#;
const SUI_ADD_TOKENS_OK: &str = r#"bridge_requests_ok{type="handle_add_tokens_on_sui"}"#;
const SUI_ADD_TOKENS_INFLIGHT: &str = r#"bridge_requests_inflight{type="handle_add_tokens_on_sui"}"#;

const CACHE_HIT_ETH_ACTION: &str = r#"bridge_signer_with_cache_hit{type="EthActionVerifier"}"#;
const CACHE_MISS_ETH_ACTION: &str = r#"bridge_signer_with_cache_miss{type="EthActionVerifier"}"#;
const CACHE_HIT_GOVERNANCE: &str = r#"bridge_signer_with_cache_hit{type="GovernanceVerifier"}"#;
const CACHE_MISS_GOVERNANCE: &str = r#"bridge_signer_with_cache_miss{type="GovernanceVerifier"}"#;
const CACHE_HIT_SUI_ACTION: &str = r#"bridge_signer_with_cache_hit{type="SuiActionVerifier"}"#;
const CACHE_MISS_SUI_ACTION: &str = r#"bridge_signer_with_cache_miss{type="SuiActionVerifier"}"#;

const ERR_BUILD_SUI_TRANSACTION: &str = "bridge_err_build_sui_transaction";
const ERR_SIGNATURE_AGGREGATION: &str = "bridge_err_signature_aggregation";
const ERR_SUI_TRANSACTION_EXECUTION: &str = "bridge_err_sui_transaction_execution";
const ERR_SUI_TRANSACTION_SUBMISSION: &str = "bridge_err_sui_transaction_submission";
const ERR_SUI_TRANSACTION_SUBMISSION_TOO_MANY_FAILURES: &str =
    "bridge_err_sui_transaction_submission_too_many_failures";

const ETH_WATCHER_RECEIVED_ACTIONS: &str = "bridge_eth_watcher_received_actions";
const ETH_WATCHER_RECEIVED_EVENTS: &str = "bridge_eth_watcher_received_events";
const ETH_WATCHER_UNRECOGNIZED_EVENTS: &str = "bridge_eth_watcher_unrecognized_events";
const SUI_WATCHER_RECEIVED_ACTIONS: &str = "bridge_sui_watcher_received_actions";
const SUI_WATCHER_RECEIVED_EVENTS: &str = "bridge_sui_watcher_received_events";

const GAS_COIN_BALANCE: &str = "bridge_gas_coin_balance";
const LAST_FINALIZED_ETH_BLOCK: &str = "bridge_last_finalized_eth_block";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthQueries {
    pub block_number: f64,
    pub call: f64,
    pub chain_id: f64,
    pub get_block_by_number: f64,
    pub get_transaction_receipt: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EthMetrics {
    pub queries: EthQueries,
}

/// Request counters for one Sui request type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuiRequests {
    pub received: f64,
    pub ok: f64,
    pub inflight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiMetrics {
    pub handle_add_tokens_on_sui: SuiRequests,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheCounters {
    pub hits: f64,
    pub misses: f64,
}

/// Signer cache counters, one pair per verifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierCache {
    pub eth_action_verifier: CacheCounters,
    pub governance_verifier: CacheCounters,
    pub sui_action_verifier: CacheCounters,
}

impl VerifierCache {
    pub fn verifiers(&self) -> [(&'static str, CacheCounters); 3] {
        [
            ("ETH Action Verifier", self.eth_action_verifier),
            ("Governance Verifier", self.governance_verifier),
            ("SUI Action Verifier", self.sui_action_verifier),
        ]
    }

    /// Hits and misses summed over all verifiers
    pub fn total(&self) -> CacheCounters {
        self.verifiers()
            .iter()
            .fold(CacheCounters::default(), |acc, (_, c)| CacheCounters {
                hits: acc.hits + c.hits,
                misses: acc.misses + c.misses,
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCounters {
    pub build_sui_transaction: f64,
    pub signature_aggregation: f64,
    pub sui_transaction_execution: f64,
    pub sui_transaction_submission: f64,
    pub sui_transaction_submission_too_many_failures: f64,
}

impl ErrorCounters {
    /// All counters with their display keys, in a stable order
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("buildSuiTransaction", self.build_sui_transaction),
            ("signatureAggregation", self.signature_aggregation),
            ("suiTransactionExecution", self.sui_transaction_execution),
            ("suiTransactionSubmission", self.sui_transaction_submission),
            (
                "suiTransactionSubmissionTooManyFailures",
                self.sui_transaction_submission_too_many_failures,
            ),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatcherActivity {
    pub received_actions: f64,
    pub received_events: f64,
    pub unrecognized_events: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetrics {
    pub eth_watcher: WatcherActivity,
    pub sui_watcher: WatcherActivity,
    /// Gas coin balance in MIST
    pub gas_coin_balance: f64,
    pub last_finalized_eth_block: f64,
}

/// One parsed scrape of a bridge node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeSnapshot {
    pub status: String,
    pub version: String,
    #[serde(rename = "uptime")]
    pub uptime_ms: f64,
    pub client_enabled: bool,
    pub eth: EthMetrics,
    pub sui: SuiMetrics,
    pub cache: VerifierCache,
    pub errors: ErrorCounters,
    pub client: ClientMetrics,
}

impl Default for BridgeSnapshot {
    fn default() -> Self {
        parse_snapshot("")
    }
}

/// Scale seconds to milliseconds; an overflow to infinity reads as 0
fn seconds_to_ms(secs: f64) -> f64 {
    let ms = secs * 1000.0;
    if ms.is_finite() {
        ms
    } else {
        0.0
    }
}

/// Parse exposition text into a snapshot.
///
/// Total: every field falls back to its default independently, so empty or
/// garbage input produces the all-zero snapshot.
pub fn parse_snapshot(text: &str) -> BridgeSnapshot {
    let value = |selector: &str| extract_value(text, selector);
    let info = extract_version_info(text);

    BridgeSnapshot {
        status: STATUS_ACTIVE.to_string(),
        version: info.version,
        uptime_ms: seconds_to_ms(value(UPTIME)),
        client_enabled: info.client_enabled,
        eth: EthMetrics {
            queries: EthQueries {
                block_number: value(ETH_BLOCK_NUMBER),
                call: value(ETH_CALL),
                chain_id: value(ETH_CHAIN_ID),
                get_block_by_number: value(ETH_GET_BLOCK_BY_NUMBER),
                get_transaction_receipt: value(ETH_GET_TRANSACTION_RECEIPT),
            },
        },
        sui: SuiMetrics {
            handle_add_tokens_on_sui: SuiRequests {
                received: value(SUI_ADD_TOKENS_RECEIVED),
                ok: value(SUI_ADD_TOKENS_OK),
                inflight: value(SUI_ADD_TOKENS_INFLIGHT),
            },
        },
        cache: VerifierCache {
            eth_action_verifier: CacheCounters {
                hits: value(CACHE_HIT_ETH_ACTION),
                misses: value(CACHE_MISS_ETH_ACTION),
            },
            governance_verifier: CacheCounters {
                hits: value(CACHE_HIT_GOVERNANCE),
                misses: value(CACHE_MISS_GOVERNANCE),
            },
            sui_action_verifier: CacheCounters {
                hits: value(CACHE_HIT_SUI_ACTION),
                misses: value(CACHE_MISS_SUI_ACTION),
            },
        },
        errors: ErrorCounters {
            build_sui_transaction: value(ERR_BUILD_SUI_TRANSACTION),
            signature_aggregation: value(ERR_SIGNATURE_AGGREGATION),
            sui_transaction_execution: value(ERR_SUI_TRANSACTION_EXECUTION),
            sui_transaction_submission: value(ERR_SUI_TRANSACTION_SUBMISSION),
            sui_transaction_submission_too_many_failures: value(
                ERR_SUI_TRANSACTION_SUBMISSION_TOO_MANY_FAILURES,
            ),
        },
        client: ClientMetrics {
            eth_watcher: WatcherActivity {
                received_actions: value(ETH_WATCHER_RECEIVED_ACTIONS),
                received_events: value(ETH_WATCHER_RECEIVED_EVENTS),
                unrecognized_events: value(ETH_WATCHER_UNRECOGNIZED_EVENTS),
            },
            // The exporter has no unrecognized-events counter for the Sui watcher
            sui_watcher: WatcherActivity {
                received_actions: value(SUI_WATCHER_RECEIVED_ACTIONS),
                received_events: value(SUI_WATCHER_RECEIVED_EVENTS),
                unrecognized_events: 0.0,
            },
            gas_coin_balance: value(GAS_COIN_BALANCE),
            last_finalized_eth_block: value(LAST_FINALIZED_ETH_BLOCK),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"# HELP uptime uptime of the node service in seconds
# TYPE uptime counter
uptime{chain_identifier="35834a8a",client_enabled="true",process="bridge",version="1.30.1-5c6f2b1"} 3723
# HELP bridge_eth_rpc_queries Total number of queries issued to eth provider, by request type
# TYPE bridge_eth_rpc_queries counter
bridge_eth_rpc_queries{type="eth_blockNumber"} 5120
bridge_eth_rpc_queries{type="eth_call"} 44
bridge_eth_rpc_queries{type="eth_chainId"} 2
bridge_eth_rpc_queries{type="eth_getBlockByNumber"} 870
bridge_eth_rpc_queries{type="eth_getTransactionReceipt"} 12
bridge_requests_received{type="handle_add_tokens_on_sui"} 9
bridge_requests_ok{type="handle_add_tokens_on_sui"} 8
bridge_requests_inflight{type="handle_add_tokens_on_sui"} 1
bridge_signer_with_cache_hit{type="EthActionVerifier"} 30
bridge_signer_with_cache_miss{type="EthActionVerifier"} 10
bridge_signer_with_cache_hit{type="GovernanceVerifier"} 0
bridge_signer_with_cache_miss{type="GovernanceVerifier"} 0
bridge_signer_with_cache_hit{type="SuiActionVerifier"} 7
bridge_signer_with_cache_miss{type="SuiActionVerifier"} 3
bridge_err_build_sui_transaction 0
bridge_err_signature_aggregation 2
bridge_err_sui_transaction_execution 0
bridge_err_sui_transaction_submission 0
bridge_err_sui_transaction_submission_too_many_failures 0
bridge_eth_watcher_received_actions 101
bridge_eth_watcher_received_events 202
bridge_eth_watcher_unrecognized_events 3
bridge_sui_watcher_received_actions 55
bridge_sui_watcher_received_events 66
bridge_sui_watcher_unrecognized_events 99
bridge_gas_coin_balance 4500000000
bridge_last_finalized_eth_block 21034567
"#;

    #[test]
    fn test_parse_full_sample() {
        let snapshot = parse_snapshot(SAMPLE);

        assert_eq!(snapshot.status, "Active");
        assert_eq!(snapshot.version, "1.30.1-5c6f2b1");
        assert!(snapshot.client_enabled);
        assert_eq!(snapshot.uptime_ms, 3_723_000.0);

        assert_eq!(snapshot.eth.queries.block_number, 5120.0);
        assert_eq!(snapshot.eth.queries.call, 44.0);
        assert_eq!(snapshot.eth.queries.chain_id, 2.0);
        assert_eq!(snapshot.eth.queries.get_block_by_number, 870.0);
        assert_eq!(snapshot.eth.queries.get_transaction_receipt, 12.0);

        let add_tokens = &snapshot.sui.handle_add_tokens_on_sui;
        assert_eq!((add_tokens.received, add_tokens.ok, add_tokens.inflight), (9.0, 8.0, 1.0));

        assert_eq!(snapshot.cache.eth_action_verifier, CacheCounters { hits: 30.0, misses: 10.0 });
        assert_eq!(snapshot.cache.governance_verifier, CacheCounters::default());
        assert_eq!(snapshot.cache.sui_action_verifier, CacheCounters { hits: 7.0, misses: 3.0 });

        assert_eq!(snapshot.errors.signature_aggregation, 2.0);
        assert_eq!(snapshot.errors.sui_transaction_submission, 0.0);

        assert_eq!(snapshot.client.eth_watcher.unrecognized_events, 3.0);
        assert_eq!(snapshot.client.sui_watcher.received_actions, 55.0);
        assert_eq!(snapshot.client.sui_watcher.received_events, 66.0);
        assert_eq!(snapshot.client.gas_coin_balance, 4_500_000_000.0);
        assert_eq!(snapshot.client.last_finalized_eth_block, 21_034_567.0);
    }

    #[test]
    fn test_sui_watcher_unrecognized_events_is_never_parsed() {
        let snapshot = parse_snapshot(SAMPLE);
        assert_eq!(snapshot.client.sui_watcher.unrecognized_events, 0.0);
    }

    #[test]
    fn test_empty_text_gives_zero_snapshot() {
        let snapshot = parse_snapshot("");
        assert_eq!(snapshot.status, "Active");
        assert_eq!(snapshot.version, "0.0.0");
        assert!(!snapshot.client_enabled);
        assert_eq!(snapshot.uptime_ms, 0.0);
        assert_eq!(snapshot.errors, ErrorCounters::default());
        assert_eq!(snapshot.client, ClientMetrics::default());
        assert_eq!(snapshot, BridgeSnapshot::default());
    }

    #[test]
    fn test_missing_lines_degrade_per_field() {
        let text = "bridge_gas_coin_balance 10\nbridge_eth_rpc_queries{type=\"eth_call\"} oops\n";
        let snapshot = parse_snapshot(text);
        assert_eq!(snapshot.client.gas_coin_balance, 10.0);
        assert_eq!(snapshot.eth.queries.call, 0.0);
        assert_eq!(snapshot.client.last_finalized_eth_block, 0.0);
    }

    #[test]
    fn test_uptime_scaling_overflow_reads_as_zero() {
        let snapshot = parse_snapshot("uptime 1e306\n");
        assert!(snapshot.uptime_ms.is_finite());
        assert_eq!(snapshot.uptime_ms, 0.0);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["uptime"], 0.0);

        // Large but representable values still scale
        let large = parse_snapshot("uptime 1e300\n").uptime_ms;
        assert!(large.is_finite() && large > 1e302);
    }

    #[test]
    fn test_cache_total_sums_verifiers() {
        let snapshot = parse_snapshot(SAMPLE);
        assert_eq!(snapshot.cache.total(), CacheCounters { hits: 37.0, misses: 13.0 });
    }

    #[test]
    fn test_json_shape_uses_dashboard_keys() {
        let json = serde_json::to_value(parse_snapshot(SAMPLE)).unwrap();
        assert_eq!(json["uptime"], 3_723_000.0);
        assert_eq!(json["clientEnabled"], true);
        assert_eq!(json["eth"]["queries"]["getTransactionReceipt"], 12.0);
        assert_eq!(json["sui"]["handleAddTokensOnSui"]["inflight"], 1.0);
        assert_eq!(json["cache"]["ethActionVerifier"]["hits"], 30.0);
        assert_eq!(json["client"]["lastFinalizedEthBlock"], 21_034_567.0);
    }
}
