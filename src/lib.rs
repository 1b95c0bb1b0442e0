//! # waymark
//!
//! A route compilation and matching engine for HTTP services.
//! It turns route patterns into a trie and answers one question per request:
//! which route, and with which parameters?
//!
//! ## The contract
//!
//! The server, the middleware stack and the handlers live elsewhere. They hand
//! waymark route registrations at startup and ask it for a [`MatchResult`] on
//! every request. What they do with the result is their business.
//!
//! What waymark owns:
//!
//! - **Pattern parsing**: `/literal/{param}/{param:constraint}/{*rest}`,
//!   validated at registration, never at request time
//! - **Trie lookup**: O(path-length) in the common case; static segments beat
//!   constrained parameters, which beat plain parameters, which beat wildcards
//! - **Deterministic ties**: specificity first, then priority, then
//!   registration order
//! - **Match caching**: bounded LRU over `(method, path)`, misses included
//! - **Conflict analysis**: duplicate, ambiguous and overlapping routes, on
//!   demand
//! - **Live updates**: copy-on-write route tables via [`SharedRouter`]
//!
//! ## Quick start
//!
//! ```rust
//! use waymark::{ConstraintKind, Method, Route, Router};
//!
//! let mut router = Router::new();
//! router.add_route(Route::new(Method::Get, "/users/{id:number}", "users::show"))?;
//! router.add_route(Route::new(Method::Get, "/users/create", "users::form"))?;
//! router.add_route(
//!     Route::new(Method::Get, "/posts/{slug}", "posts::show")
//!         .with_constraint("slug", ConstraintKind::Slug)
//!         .with_name("posts.show"),
//! )?;
//!
//! let found = router.match_route(Method::Get, "/users/42").unwrap();
//! assert_eq!(*found.handler(), "users::show");
//! assert_eq!(found.param("id"), Some("42"));
//!
//! // Static beats dynamic at the same depth.
//! let found = router.match_route(Method::Get, "/users/create").unwrap();
//! assert_eq!(*found.handler(), "users::form");
//!
//! // Constraint rejections are plain misses.
//! assert!(router.match_route(Method::Get, "/users/abc").is_none());
//!
//! assert_eq!(
//!     router.url_for_params("posts.show", &[("slug", "hello-world")]).as_deref(),
//!     Some("/posts/hello-world"),
//! );
//! # Ok::<(), waymark::PatternError>(())
//! ```

mod cache;
mod config;
mod constraint;
mod error;
mod method;
mod route;
mod router;
mod score;
mod segment;
mod shared;
mod stats;
mod trie;

pub mod conflict;

pub use config::RouterConfig;
pub use conflict::{Conflict, ConflictKind, ConflictSummary, Severity};
pub use constraint::{Constraint, ConstraintKind};
pub use error::{Error, PatternError};
pub use method::Method;
pub use route::{MatchResult, Route};
pub use router::Router;
pub use score::{CompiledRoute, by_specificity, default_priority, static_score};
pub use segment::{Segment, parse_path};
pub use shared::SharedRouter;
pub use stats::{CacheStats, RouterStats};
