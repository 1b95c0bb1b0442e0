//! Live route updates.
//!
//! A [`Router`] is immutable while it serves. To change routes without a
//! restart, [`SharedRouter`] builds a new router off to the side and swaps
//! it in atomically:
//!
//! ```text
//! readers ──load()──▶ ArcSwap ──▶ Router v1      (keeps serving)
//! writer  ──update()─▶ rebuild v1 → apply edit → Router v2
//!                      store(v2): new lookups see v2, in-flight ones finish on v1
//! ```
//!
//! Readers never take a lock on the route table and never see a half-built
//! trie. Writers are serialized. Each swap starts with an empty match cache
//! and fresh stats.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tracing::info;

use crate::error::PatternError;
use crate::method::Method;
use crate::route::{MatchResult, Route};
use crate::router::Router;

pub struct SharedRouter<H> {
    active: ArcSwap<Router<H>>,
    writer: Mutex<()>,
}

impl<H> SharedRouter<H> {
    pub fn new(router: Router<H>) -> Self {
        Self {
            active: ArcSwap::from_pointee(router),
            writer: Mutex::new(()),
        }
    }

    /// The router currently serving. Stays valid after later swaps.
    pub fn load(&self) -> Arc<Router<H>> {
        self.active.load_full()
    }

    pub fn match_route(&self, method: Method, path: &str) -> Option<MatchResult<H>> {
        self.active.load().match_route(method, path)
    }

    /// Applies `edit` to a copy of the active router and swaps the copy in.
    ///
    /// If `edit` fails the active router is left as it was and the error is
    /// returned.
    pub fn update<F>(&self, edit: F) -> Result<(), PatternError>
    where
        F: FnOnce(&mut Router<H>) -> Result<(), PatternError>,
    {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = self.active.load().rebuild();
        edit(&mut next)?;

        let routes = next.len();
        self.active.store(Arc::new(next));
        info!(routes, "route table swapped");
        Ok(())
    }

    pub fn add_route(&self, route: Route<H>) -> Result<(), PatternError> {
        self.update(|router| router.add_route(route))
    }
}

impl<H> From<Router<H>> for SharedRouter<H> {
    fn from(router: Router<H>) -> Self {
        Self::new(router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_swaps_in_new_routes() {
        let shared = SharedRouter::new(Router::new().on(Method::Get, "/a", 1).unwrap());
        let before = shared.load();

        shared.add_route(Route::new(Method::Get, "/b", 2)).unwrap();

        assert!(shared.match_route(Method::Get, "/b").is_some());
        assert!(shared.match_route(Method::Get, "/a").is_some());
        // The old snapshot is untouched.
        assert!(before.match_route(Method::Get, "/b").is_none());
        assert_eq!(before.len(), 1);
    }

    #[test]
    fn failed_update_keeps_active_router() {
        let shared = SharedRouter::new(Router::new().on(Method::Get, "/a", 1).unwrap());
        let err = shared.update(|router| {
            router.add_route(Route::new(Method::Get, "/b", 2))?;
            router.add_route(Route::new(Method::Get, "/c/{", 3))
        });

        assert!(err.is_err());
        assert_eq!(shared.load().len(), 1);
        assert!(shared.match_route(Method::Get, "/b").is_none());
    }
}
