//! Specificity scoring and compiled routes.
//!
//! Two numbers decide which of several overlapping routes wins:
//!
//! - **static score**: how many literal segments the path has. `/users/new`
//!   (2) is more specific than `/users/{id}` (1).
//! - **priority**: an explicit value from [`Route::with_priority`], or the
//!   negated registration sequence, so the first route registered outranks
//!   later ones.
//!
//! The trie picks among competing constrained branches with
//! [`by_specificity`], terminal nodes pick among same-shaped routes with
//! priority, and the router's introspection lists sort with
//! [`by_specificity`] too.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::PatternError;
use crate::method::Method;
use crate::route::Route;
use crate::segment::{self, Segment};

/// Number of literal segments.
pub fn static_score(segments: &[Segment]) -> usize {
    segments.iter().filter(|s| s.is_static()).count()
}

/// Priority assigned to a route that does not set one.
pub fn default_priority(sequence: u64) -> i64 {
    -(sequence as i64)
}

/// A route with its parsed segments and scores.
#[derive(Debug)]
pub struct CompiledRoute<H> {
    route: Route<H>,
    segments: Vec<Segment>,
    static_score: usize,
    priority: i64,
    sequence: u64,
}

impl<H> CompiledRoute<H> {
    /// Parses the route's path and applies its declared constraints.
    pub(crate) fn compile(route: Route<H>, sequence: u64) -> Result<Self, PatternError> {
        let mut segments = segment::parse_path(route.path())?;
        segment::apply_declared(&mut segments, route.constraints(), route.path())?;

        let static_score = static_score(&segments);
        let priority = route.priority().unwrap_or_else(|| default_priority(sequence));

        Ok(Self { route, segments, static_score, priority, sequence })
    }

    pub fn route(&self) -> &Route<H> { &self.route }
    pub fn segments(&self) -> &[Segment] { &self.segments }
    pub fn static_score(&self) -> usize { self.static_score }
    pub fn priority(&self) -> i64 { self.priority }
    pub fn sequence(&self) -> u64 { self.sequence }
    pub fn method(&self) -> Method { self.route.method() }
    pub fn path(&self) -> &str { self.route.path() }

    /// Pairs captured values with this route's parameter names.
    ///
    /// `captures` holds one value per non-static segment, in path order.
    pub(crate) fn params_from(&self, captures: Vec<Cow<'_, str>>) -> HashMap<String, String> {
        self.segments
            .iter()
            .filter_map(Segment::param_name)
            .zip(captures)
            .map(|(name, value)| (name.to_owned(), value.into_owned()))
            .collect()
    }

    /// Builds a concrete path from parameter values.
    ///
    /// Returns `None` when a parameter is missing, empty, contains a `/`
    /// (wildcards excepted), or fails its constraint.
    pub fn generate_url(&self, params: &HashMap<String, String>) -> Option<String> {
        let parts = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Static(literal) => Some(literal.as_str()),
                Segment::Param(name) => params
                    .get(name)
                    .map(String::as_str)
                    .filter(|v| !v.is_empty() && !v.contains('/')),
                Segment::ConstrainedParam(name, constraint) => params
                    .get(name)
                    .map(String::as_str)
                    .filter(|v| constraint.matches(v)),
                Segment::Wildcard(name) => params
                    .get(name)
                    .map(|v| v.trim_matches('/'))
                    .filter(|v| !v.is_empty()),
            })
            .collect::<Option<Vec<_>>>()?;

        Some(format!("/{}", parts.join("/")))
    }
}

/// Most specific first: static score descending, then priority descending,
/// then registration order.
pub fn by_specificity<H>(a: &CompiledRoute<H>, b: &CompiledRoute<H>) -> Ordering {
    b.static_score
        .cmp(&a.static_score)
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.sequence.cmp(&b.sequence))
}

/// Winner among routes that end at the same trie node: priority descending,
/// then registration order.
pub(crate) fn by_priority<H>(a: &CompiledRoute<H>, b: &CompiledRoute<H>) -> Ordering {
    b.priority.cmp(&a.priority).then_with(|| a.sequence.cmp(&b.sequence))
}
