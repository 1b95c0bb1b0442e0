//! The route compiler.
//!
//! Owns the trie, the match cache, the lookup statistics and the name index.
//! Build it once at startup with [`Router::add_route`] / [`Router::on`], then
//! share it by reference: lookups take `&self`, registration takes
//! `&mut self`, so the borrow checker keeps the two phases apart. To change
//! routes while serving, use [`SharedRouter`](crate::SharedRouter).

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, info, trace, warn};

use crate::cache::{MatchCache, cache_key};
use crate::config::RouterConfig;
use crate::conflict::{self, Conflict};
use crate::error::PatternError;
use crate::method::Method;
use crate::route::{MatchResult, Route};
use crate::score::{self, CompiledRoute};
use crate::stats::{CacheOutcome, CacheStats, RouterStats};
use crate::trie::RouteTrie;

/// Mutable lookup-side state. Guarded by one mutex that is never held
/// across a trie walk.
struct MatchState<H> {
    cache: MatchCache<H>,
    stats: RouterStats,
}

impl<H> MatchState<H> {
    fn new(config: &RouterConfig) -> Self {
        Self {
            cache: MatchCache::new(config.enable_cache, config.cache_size),
            stats: RouterStats::default(),
        }
    }
}

/// The application router.
///
/// One segment trie for every method. O(path-length) lookup in the common
/// case, with backtracking among parameter branches only when siblings
/// compete. Each [`Router::on`] call returns `self` so registrations chain:
///
/// ```rust
/// use waymark::{Method, Router};
///
/// let router = Router::new()
///     .on(Method::Get,    "/users/{id:number}", "show")?
///     .on(Method::Get,    "/users/create",      "form")?
///     .on(Method::Delete, "/users/{id:number}", "destroy")?;
///
/// let found = router.match_route(Method::Get, "/users/42").unwrap();
/// assert_eq!(*found.handler(), "show");
/// assert_eq!(found.param("id"), Some("42"));
/// # Ok::<(), waymark::PatternError>(())
/// ```
pub struct Router<H> {
    config: RouterConfig,
    trie: RouteTrie<H>,
    routes: Vec<Arc<CompiledRoute<H>>>,
    names: HashMap<String, Arc<CompiledRoute<H>>>,
    next_sequence: u64,
    state: Mutex<MatchState<H>>,
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        let state = Mutex::new(MatchState::new(&config));
        Self {
            config,
            trie: RouteTrie::new(),
            routes: Vec::new(),
            names: HashMap::new(),
            next_sequence: 0,
            state,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    // ── Registration ──────────────────────────────────────────────────────────

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Shorthand for [`Router::add_route`] with a bare [`Route`].
    pub fn on(mut self, method: Method, path: &str, handler: H) -> Result<Self, PatternError> {
        self.add_route(Route::new(method, path, handler))?;
        Ok(self)
    }

    /// Compiles and inserts a route.
    ///
    /// A malformed path is rejected before anything is touched. On success the
    /// match cache is emptied: the new route may outrank whatever was cached.
    pub fn add_route(&mut self, route: Route<H>) -> Result<(), PatternError> {
        let compiled = CompiledRoute::compile(route, self.next_sequence)?;
        self.next_sequence += 1;

        debug!(
            method = %compiled.method(),
            path = compiled.path(),
            static_score = compiled.static_score(),
            priority = compiled.priority(),
            "route registered"
        );

        let compiled = Arc::new(compiled);
        if let Some(previous) = self.insert_compiled(Arc::clone(&compiled)) {
            warn!(
                route_name = compiled.route().name().unwrap_or_default(),
                previous = previous.path(),
                current = compiled.path(),
                "route name registered twice, the later route wins"
            );
        }
        self.state_mut().cache.clear();
        Ok(())
    }

    /// Inserts into the trie and the name index. Returns the route that
    /// previously held this route's name, if any.
    fn insert_compiled(&mut self, compiled: Arc<CompiledRoute<H>>) -> Option<Arc<CompiledRoute<H>>> {
        self.trie.insert(Arc::clone(&compiled));
        let previous = compiled
            .route()
            .name()
            .and_then(|name| self.names.insert(name.to_owned(), Arc::clone(&compiled)));
        self.routes.push(compiled);
        previous
    }

    /// A fresh router with the same configuration and routes, and empty
    /// cache and stats. Registration continues the sequence where this one
    /// left off. Name clashes were reported when the routes were added, so
    /// replaying them is silent.
    pub(crate) fn rebuild(&self) -> Self {
        let mut next = Self::with_config(self.config.clone());
        next.next_sequence = self.next_sequence;
        for route in &self.routes {
            next.insert_compiled(Arc::clone(route));
        }
        next
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    /// Resolves a request to a route and its path parameters.
    ///
    /// `None` means nothing matched; the caller turns that into a 404.
    /// Repeated calls with no registration in between always return the same
    /// route for the same `(method, path)`.
    pub fn match_route(&self, method: Method, path: &str) -> Option<MatchResult<H>> {
        let started = Instant::now();
        let key = self.config.cache_enabled().then(|| cache_key(method, path));

        if let Some(key) = &key {
            let mut state = self.state();
            if let Some(cached) = state.cache.get(key) {
                state.stats.record(method, CacheOutcome::Hit, started.elapsed());
                trace!(%method, path, hit = cached.is_some(), "match cache hit");
                return cached;
            }
        }

        let result = self.resolve(method, path);
        trace!(%method, path, matched = result.is_some(), "trie lookup");

        let mut state = self.state();
        let outcome = match key {
            Some(key) => {
                state.cache.insert(key, result.clone());
                CacheOutcome::Miss
            }
            None => CacheOutcome::Bypass,
        };
        state.stats.record(method, outcome, started.elapsed());
        result
    }

    /// Like [`Router::match_route`] for a method still in wire form.
    ///
    /// An unknown method matches nothing and is not counted.
    pub fn match_str(&self, method: &str, path: &str) -> Option<MatchResult<H>> {
        let method = method.parse().ok()?;
        self.match_route(method, path)
    }

    fn resolve(&self, method: Method, path: &str) -> Option<MatchResult<H>> {
        let (route, captures) = self.trie.find(method, path)?;
        let params = route.params_from(captures);
        Some(MatchResult { route, params })
    }

    /// Looks up a known hot set ahead of traffic so the first real requests
    /// hit the cache. Returns how many of the requests resolved to a route.
    pub fn warm_cache<'a, I>(&self, requests: I) -> usize
    where
        I: IntoIterator<Item = (Method, &'a str)>,
    {
        let mut requested = 0usize;
        let mut resolved = 0;
        for (method, path) in requests {
            requested += 1;
            if self.match_route(method, path).is_some() {
                resolved += 1;
            }
        }
        info!(requested, resolved, cached = self.state().cache.stats().size, "match cache warmed");
        resolved
    }

    /// Builds a path for a named route.
    ///
    /// `None` if no route has that name or a parameter is missing or fails
    /// its constraint.
    pub fn url_for(&self, name: &str, params: &HashMap<String, String>) -> Option<String> {
        self.names.get(name)?.generate_url(params)
    }

    /// Like [`Router::url_for`] with parameters as pairs.
    pub fn url_for_params(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        let params = params
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        self.url_for(name, &params)
    }

    // ── Introspection ─────────────────────────────────────────────────────────

    /// Every compiled route, in registration order, or most specific first
    /// when `optimize_priorities` is on.
    pub fn compiled_routes(&self) -> Vec<Arc<CompiledRoute<H>>> {
        let mut routes = self.routes.clone();
        if self.config.optimize_priorities {
            routes.sort_by(|a, b| score::by_specificity(a, b));
        }
        routes
    }

    /// Compiled routes grouped by method, each group ordered like
    /// [`Router::compiled_routes`].
    pub fn routes_by_method(&self) -> BTreeMap<Method, Vec<Arc<CompiledRoute<H>>>> {
        let mut grouped: BTreeMap<Method, Vec<_>> = BTreeMap::new();
        for route in self.compiled_routes() {
            grouped.entry(route.method()).or_default().push(route);
        }
        grouped
    }

    pub fn route_by_name(&self, name: &str) -> Option<&Arc<CompiledRoute<H>>> {
        self.names.get(name)
    }

    /// Duplicate, ambiguous and overlapping route pairs. Advisory only.
    pub fn route_conflicts(&self) -> Vec<Conflict<H>> {
        conflict::analyze(&self.routes, self.config.ambiguity_window)
    }

    pub fn stats(&self) -> RouterStats {
        let mut stats = self.state().stats.clone();
        stats.route_count = self.routes.len();
        stats
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.state().cache.stats()
    }

    /// Number of nodes in the trie, root included.
    pub fn node_count(&self) -> usize {
        self.trie.node_count()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    // ── Reset ─────────────────────────────────────────────────────────────────

    /// Drops every route, cached lookup and counter.
    pub fn clear(&mut self) {
        let dropped = self.routes.len();
        self.trie.clear();
        self.routes.clear();
        self.names.clear();
        self.next_sequence = 0;
        let fresh = MatchState::new(&self.config);
        *self.state_mut() = fresh;
        info!(dropped, "router cleared");
    }

    pub fn clear_cache(&self) {
        self.state().cache.clear();
        debug!("match cache cleared");
    }

    pub fn reset_stats(&self) {
        let mut state = self.state();
        state.stats = RouterStats::default();
        state.cache.reset_counters();
    }

    #[cfg(test)]
    pub(crate) fn is_cached(&self, method: Method, path: &str) -> bool {
        self.state().cache.contains(&cache_key(method, path))
    }

    // A panic while holding the lock leaves counters at worst one lookup
    // behind; the cache never holds a partial entry. Keep going.
    fn state(&self) -> MutexGuard<'_, MatchState<H>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut MatchState<H> {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router<&'static str> {
        Router::new()
            .on(Method::Get, "/users/{id}", "show").unwrap()
            .on(Method::Get, "/users/create", "create").unwrap()
    }

    #[test]
    fn failed_registration_leaves_router_untouched() {
        let mut router = router();
        router.match_route(Method::Get, "/users/1");
        assert!(router.is_cached(Method::Get, "/users/1"));

        let err = router.add_route(Route::new(Method::Get, "/broken/{id", "x"));
        assert!(matches!(err, Err(PatternError::UnbalancedBraces { .. })));
        assert_eq!(router.len(), 2);
        assert!(router.is_cached(Method::Get, "/users/1"));
    }

    #[test]
    fn add_route_clears_cache() {
        let mut router = router();
        router.match_route(Method::Get, "/users/1");
        router.add_route(Route::new(Method::Get, "/about", "about")).unwrap();
        assert!(!router.is_cached(Method::Get, "/users/1"));
    }

    #[test]
    fn later_name_wins() {
        let mut router = Router::new();
        router.add_route(Route::new(Method::Get, "/old/{id}", 1).with_name("item")).unwrap();
        router.add_route(Route::new(Method::Get, "/new/{id}", 2).with_name("item")).unwrap();
        assert_eq!(router.url_for_params("item", &[("id", "5")]).as_deref(), Some("/new/5"));
    }

    #[test]
    fn name_clash_warns_once_across_rebuilds() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        use tracing_subscriber::layer::{Context, SubscriberExt};

        struct Warnings(Arc<AtomicUsize>);

        impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Warnings {
            fn on_event(&self, event: &tracing::Event<'_>, _: Context<'_, S>) {
                if *event.metadata().level() == tracing::Level::WARN {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(Warnings(Arc::clone(&warnings)));

        tracing::subscriber::with_default(subscriber, || {
            let mut router = Router::new();
            router.add_route(Route::new(Method::Get, "/old/{id}", 1).with_name("item")).unwrap();
            router.add_route(Route::new(Method::Get, "/new/{id}", 2).with_name("item")).unwrap();
            assert_eq!(warnings.load(Ordering::SeqCst), 1);

            let next = router.rebuild().rebuild();
            assert_eq!(warnings.load(Ordering::SeqCst), 1);
            assert_eq!(next.url_for_params("item", &[("id", "5")]).as_deref(), Some("/new/5"));
        });
    }

    #[test]
    fn rebuild_keeps_routes_and_sequence() {
        let router = router();
        let mut next = router.rebuild();
        next.add_route(Route::new(Method::Get, "/users/{name:alpha}", "by-name")).unwrap();

        let sequences: Vec<_> = next.compiled_routes().iter().map(|r| r.sequence()).collect();
        assert_eq!(sequences, [0, 1, 2]);
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn clear_resets_everything() {
        let mut router = router();
        router.match_route(Method::Get, "/users/1");
        router.clear();
        assert!(router.is_empty());
        assert_eq!(router.stats().total_matches, 0);
        assert_eq!(router.cache_stats().size, 0);
        assert_eq!(router.match_route(Method::Get, "/users/1"), None);
    }
}
