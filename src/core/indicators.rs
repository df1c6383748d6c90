//! Derived display values computed from snapshots and history

use chrono::{DateTime, Duration, Utc};

use super::bridge_metrics::{BridgeSnapshot, ErrorCounters, VerifierCache};
use super::history::History;
use crate::utils::MIST_PER_SUI;

const MS_PER_MINUTE: u64 = 60 * 1000;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Cache hit ratio as a percentage; 0 when there were no lookups.
pub fn cache_hit_ratio(hits: f64, misses: f64) -> f64 {
    let total = hits + misses;
    if total == 0.0 {
        0.0
    } else {
        hits / total * 100.0
    }
}

/// Hit ratio across all three verifiers combined
pub fn overall_cache_hit_ratio(cache: &VerifierCache) -> f64 {
    let total = cache.total();
    cache_hit_ratio(total.hits, total.misses)
}

/// Format an uptime in milliseconds as `"{days}d {hours}h {minutes}m"`.
///
/// Seconds are dropped.
pub fn format_uptime(ms: f64) -> String {
    let ms = if ms.is_finite() && ms > 0.0 { ms as u64 } else { 0 };
    let days = ms / MS_PER_DAY;
    let hours = (ms % MS_PER_DAY) / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    format!("{}d {}h {}m", days, hours, minutes)
}

/// When the node came up, given its uptime as of `now`.
///
/// `None` when the uptime reaches past the representable date range.
pub fn up_since(uptime_ms: f64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let elapsed = Duration::try_milliseconds(uptime_ms.max(0.0) as i64)?;
    now.checked_sub_signed(elapsed)
}

/// True if any bridge error counter is above zero
pub fn has_active_errors(snapshot: &BridgeSnapshot) -> bool {
    snapshot.errors.entries().iter().any(|(_, value)| *value > 0.0)
}

/// Non-zero error counters, for the alert banner
pub fn active_errors(errors: &ErrorCounters) -> Vec<(&'static str, f64)> {
    errors
        .entries()
        .into_iter()
        .filter(|(_, value)| *value > 0.0)
        .collect()
}

/// Gas coin balance converted from MIST to SUI
pub fn gas_balance_sui(mist: f64) -> f64 {
    mist / MIST_PER_SUI
}

/// Overall cache hit ratio per history point
pub fn cache_ratio_series(history: &History) -> Vec<(DateTime<Utc>, f64)> {
    history.series(|snapshot| overall_cache_hit_ratio(&snapshot.cache))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cache_hit_ratio() {
        assert_eq!(cache_hit_ratio(0.0, 0.0), 0.0);
        assert_eq!(cache_hit_ratio(3.0, 1.0), 75.0);
        assert_eq!(cache_hit_ratio(0.0, 5.0), 0.0);
        assert_eq!(cache_hit_ratio(5.0, 0.0), 100.0);
    }

    #[test]
    fn test_overall_ratio_sums_verifiers() {
        let mut cache = VerifierCache::default();
        cache.eth_action_verifier.hits = 2.0;
        cache.sui_action_verifier.hits = 1.0;
        cache.governance_verifier.misses = 1.0;
        assert_eq!(overall_cache_hit_ratio(&cache), 75.0);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(90_000_000.0), "1d 1h 0m");
        assert_eq!(format_uptime(0.0), "0d 0h 0m");
        assert_eq!(format_uptime(59_999.0), "0d 0h 0m");
        assert_eq!(format_uptime(3_723_000.0), "0d 1h 2m");
        assert_eq!(format_uptime(f64::NAN), "0d 0h 0m");
    }

    #[test]
    fn test_up_since() {
        let now = Utc.timestamp_opt(1_700_086_400, 0).unwrap();
        let since = up_since(86_400_000.0, now);
        assert_eq!(since, Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
    }

    #[test]
    fn test_up_since_out_of_range_uptime() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let snapshot = crate::core::bridge_metrics::parse_snapshot("uptime 10000000000000\n");

        assert_eq!(up_since(snapshot.uptime_ms, now), None);
        assert_eq!(up_since(f64::MAX, now), None);
        assert_eq!(up_since(-5.0, now), Some(now));
    }

    #[test]
    fn test_active_errors() {
        let mut snapshot = BridgeSnapshot::default();
        assert!(!has_active_errors(&snapshot));
        assert!(active_errors(&snapshot.errors).is_empty());

        snapshot.errors.sui_transaction_submission_too_many_failures = 4.0;
        assert!(has_active_errors(&snapshot));
        assert_eq!(
            active_errors(&snapshot.errors),
            vec![("suiTransactionSubmissionTooManyFailures", 4.0)]
        );
    }

    #[test]
    fn test_gas_balance_sui() {
        assert_eq!(gas_balance_sui(4_500_000_000.0), 4.5);
    }

    #[test]
    fn test_cache_ratio_series() {
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut first = BridgeSnapshot::default();
        first.cache.eth_action_verifier.hits = 1.0;
        first.cache.eth_action_verifier.misses = 1.0;

        let history = History::new()
            .append(first, t0)
            .append(BridgeSnapshot::default(), t0 + Duration::seconds(30));

        let series = cache_ratio_series(&history);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].1, 50.0);
        assert_eq!(series[1].1, 0.0);
    }
}
