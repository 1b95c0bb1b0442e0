//! Bounded match cache.
//!
//! Maps `"{METHOD}:{path}"` to the lookup result, misses included, so a
//! path that 404s repeatedly costs one trie walk. When full, the least
//! recently used entry is evicted to make room.
//!
//! The whole cache is dropped whenever a route is added: a new route can
//! change the winner for any path already cached.

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::method::Method;
use crate::route::MatchResult;
use crate::stats::{CacheStats, ratio};

/// Cache key for a lookup. Exact: no case folding or path normalization.
pub(crate) fn cache_key(method: Method, path: &str) -> String {
    format!("{}:{}", method.as_str(), path)
}

pub(crate) struct MatchCache<H> {
    entries: Option<LruCache<String, Option<MatchResult<H>>>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<H> MatchCache<H> {
    /// A zero capacity disables the cache, same as `enabled = false`.
    pub(crate) fn new(enabled: bool, capacity: usize) -> Self {
        let entries = NonZeroUsize::new(capacity)
            .filter(|_| enabled)
            .map(LruCache::new);
        Self { entries, hits: 0, misses: 0, evictions: 0 }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// Looks up a key, counting the hit or miss.
    ///
    /// The outer `Option` is the cache's answer (`None` = not cached); the
    /// inner one is the cached lookup result.
    pub(crate) fn get(&mut self, key: &str) -> Option<Option<MatchResult<H>>> {
        let entries = self.entries.as_mut()?;
        match entries.get(key) {
            Some(result) => {
                self.hits += 1;
                Some(result.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub(crate) fn insert(&mut self, key: String, result: Option<MatchResult<H>>) {
        let Some(entries) = self.entries.as_mut() else { return };
        // `push` hands back the displaced entry: the old value for a
        // re-inserted key, or the LRU victim when full.
        if let Some((displaced, _)) = entries.push(key.clone(), result) {
            if displaced != key {
                self.evictions += 1;
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        if let Some(entries) = self.entries.as_mut() {
            entries.clear();
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.as_ref().is_some_and(|e| e.contains(key))
    }

    pub(crate) fn reset_counters(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.is_enabled(),
            size: self.entries.as_ref().map_or(0, LruCache::len),
            capacity: self.entries.as_ref().map_or(0, |e| e.cap().get()),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            hit_rate: ratio(self.hits, self.hits + self.misses),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::route::Route;
    use crate::score::CompiledRoute;

    fn result(path: &str) -> MatchResult<()> {
        let compiled = CompiledRoute::compile(Route::new(Method::Get, path, ()), 0).unwrap();
        MatchResult { route: Arc::new(compiled), params: Default::default() }
    }

    #[test]
    fn key_format() {
        assert_eq!(cache_key(Method::Get, "/a/b"), "GET:/a/b");
    }

    #[test]
    fn hit_and_miss_accounting() {
        let mut cache = MatchCache::new(true, 4);
        assert_eq!(cache.get("GET:/a"), None);
        cache.insert("GET:/a".into(), Some(result("/a")));
        assert!(cache.get("GET:/a").unwrap().is_some());

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
    }

    #[test]
    fn negative_entries_are_cached() {
        let mut cache = MatchCache::<()>::new(true, 4);
        cache.insert("GET:/nope".into(), None);
        assert_eq!(cache.get("GET:/nope"), Some(None));
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = MatchCache::<()>::new(true, 2);
        cache.insert("GET:/a".into(), None);
        cache.insert("GET:/b".into(), None);
        cache.get("GET:/a");
        cache.insert("GET:/c".into(), None);

        assert!(cache.contains("GET:/a"));
        assert!(!cache.contains("GET:/b"));
        assert!(cache.contains("GET:/c"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn reinserting_a_key_is_not_an_eviction() {
        let mut cache = MatchCache::<()>::new(true, 2);
        cache.insert("GET:/a".into(), None);
        cache.insert("GET:/a".into(), None);
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn disabled_cache_stores_and_counts_nothing() {
        for cache in [MatchCache::<()>::new(false, 8), MatchCache::<()>::new(true, 0)] {
            let mut cache = cache;
            cache.insert("GET:/a".into(), None);
            assert_eq!(cache.get("GET:/a"), None);
            assert_eq!(cache.stats(), CacheStats::default());
        }
    }
}
