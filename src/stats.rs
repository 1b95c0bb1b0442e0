//! Lookup statistics.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::method::Method;

/// How a lookup interacted with the match cache.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CacheOutcome {
    Hit,
    Miss,
    /// Caching is disabled.
    Bypass,
}

/// Running counters over every [`Router::match_route`](crate::Router::match_route) call.
///
/// A snapshot: the router hands out copies, never a live view.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RouterStats {
    pub total_matches: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Incremental mean over all lookups, cache hits included.
    pub average_match_time: Duration,
    pub method_distribution: HashMap<Method, u64>,
    pub route_count: usize,
    #[serde(skip)]
    mean_nanos: f64,
}

impl RouterStats {
    pub(crate) fn record(&mut self, method: Method, outcome: CacheOutcome, elapsed: Duration) {
        self.total_matches += 1;
        match outcome {
            CacheOutcome::Hit => self.cache_hits += 1,
            CacheOutcome::Miss => self.cache_misses += 1,
            CacheOutcome::Bypass => {}
        }
        *self.method_distribution.entry(method).or_default() += 1;

        let sample = elapsed.as_nanos() as f64;
        self.mean_nanos += (sample - self.mean_nanos) / self.total_matches as f64;
        self.average_match_time = Duration::from_nanos(self.mean_nanos.round() as u64);
    }

    /// Share of cached lookups that hit, in `0.0..=1.0`.
    pub fn hit_rate(&self) -> f64 {
        ratio(self.cache_hits, self.cache_hits + self.cache_misses)
    }
}

/// Match cache occupancy and counters.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}

pub(crate) fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_mean() {
        let mut stats = RouterStats::default();
        stats.record(Method::Get, CacheOutcome::Miss, Duration::from_nanos(100));
        stats.record(Method::Get, CacheOutcome::Hit, Duration::from_nanos(300));
        stats.record(Method::Post, CacheOutcome::Bypass, Duration::from_nanos(200));

        assert_eq!(stats.total_matches, 3);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.average_match_time, Duration::from_nanos(200));
        assert_eq!(stats.method_distribution[&Method::Get], 2);
        assert_eq!(stats.method_distribution[&Method::Post], 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn serialises_methods_as_wire_strings() {
        let mut stats = RouterStats::default();
        stats.record(Method::Delete, CacheOutcome::Bypass, Duration::ZERO);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["method_distribution"]["DELETE"], 1);
        assert!(json.get("mean_nanos").is_none());
    }
}
