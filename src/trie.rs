//! Segment trie.
//!
//! One node per segment position. Each node holds
//!
//! - a map of literal text → static child, for O(1) dispatch,
//! - the dynamic children in kind order: constrained parameters, then the
//!   plain parameter, then the wildcard,
//! - the routes whose paths end exactly here, highest priority first.
//!
//! Lookup walks the request path one segment at a time, trying the static
//! child first and falling back to dynamic children. A branch that dead-ends
//! (no route for the method, a constraint rejecting the segment) backtracks
//! to the next candidate. Without dynamic siblings the walk is linear in the
//! number of segments.
//!
//! Several constrained children can accept the same segment. Every one of
//! them is resolved for the requested method and the most specific route
//! found wins, so a sibling's unrelated routes (another method, a deeper path
//! the request never reaches) cannot change the outcome.
//!
//! Dynamic children are keyed by what they accept, not by parameter name:
//! `/users/{id}` and `/users/{uid}/posts` share one `{…}` node. Captured
//! values are positional and get their names from the winning route.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::constraint::Constraint;
use crate::method::Method;
use crate::score::{self, CompiledRoute};
use crate::segment::Segment;

/// What a dynamic edge accepts.
#[derive(Debug, PartialEq)]
enum Edge {
    Constrained(Constraint),
    Param,
    Wildcard,
}

impl Edge {
    fn rank(&self) -> u8 {
        match self {
            Self::Constrained(_) => 0,
            Self::Param => 1,
            Self::Wildcard => 2,
        }
    }
}

struct Dynamic<H> {
    edge: Edge,
    node: Node<H>,
}

struct Node<H> {
    statics: HashMap<String, Node<H>>,
    dynamics: Vec<Dynamic<H>>,
    routes: Vec<Arc<CompiledRoute<H>>>,
}

impl<H> Default for Node<H> {
    fn default() -> Self {
        Self {
            statics: HashMap::new(),
            dynamics: Vec::new(),
            routes: Vec::new(),
        }
    }
}

impl<H> Node<H> {
    fn insert(&mut self, segments: &[Segment], route: Arc<CompiledRoute<H>>) {
        let Some((first, rest)) = segments.split_first() else {
            self.routes.push(route);
            self.routes.sort_by(|a, b| score::by_priority(a, b));
            return;
        };

        let edge = match first {
            Segment::Static(literal) => {
                self.statics.entry(literal.clone()).or_default().insert(rest, route);
                return;
            }
            Segment::Param(_) => Edge::Param,
            Segment::ConstrainedParam(_, constraint) => Edge::Constrained(constraint.clone()),
            Segment::Wildcard(_) => Edge::Wildcard,
        };

        let index = match self.dynamics.iter().position(|d| d.edge == edge) {
            Some(index) => index,
            None => {
                self.dynamics.push(Dynamic { edge, node: Node::default() });
                self.dynamics.len() - 1
            }
        };
        self.dynamics[index].node.insert(rest, route);
        // Stable: siblings of one kind keep insertion order.
        self.dynamics.sort_by_key(|d| d.edge.rank());
    }

    fn route_for(&self, method: Method) -> Option<&Arc<CompiledRoute<H>>> {
        self.routes.iter().find(|r| r.method() == method)
    }

    fn find<'n, 'p>(
        &'n self,
        method: Method,
        segments: &[&'p str],
        captures: &mut Vec<Cow<'p, str>>,
    ) -> Option<&'n Arc<CompiledRoute<H>>> {
        let Some((&first, rest)) = segments.split_first() else {
            return self.route_for(method);
        };

        if let Some(found) = self
            .statics
            .get(first)
            .and_then(|child| child.find(method, rest, captures))
        {
            return Some(found);
        }

        let mut best: Option<(&'n Arc<CompiledRoute<H>>, Vec<Cow<'p, str>>)> = None;
        for dynamic in &self.dynamics {
            match &dynamic.edge {
                Edge::Constrained(constraint) => {
                    if !constraint.matches(first) {
                        continue;
                    }
                    let mut trial = captures.clone();
                    trial.push(Cow::Borrowed(first));
                    let Some(found) = dynamic.node.find(method, rest, &mut trial) else { continue };
                    if best
                        .as_ref()
                        .is_none_or(|(current, _)| score::by_specificity::<H>(found, current).is_lt())
                    {
                        best = Some((found, trial));
                    }
                }
                // Constrained candidates outrank the plain and wildcard edges.
                _ if best.is_some() => break,
                Edge::Param => {
                    captures.push(Cow::Borrowed(first));
                    if let Some(found) = dynamic.node.find(method, rest, captures) {
                        return Some(found);
                    }
                    captures.pop();
                }
                Edge::Wildcard => {
                    if let Some(found) = dynamic.node.route_for(method) {
                        captures.push(if rest.is_empty() {
                            Cow::Borrowed(first)
                        } else {
                            Cow::Owned(segments.join("/"))
                        });
                        return Some(found);
                    }
                }
            }
        }

        let (found, trial) = best?;
        *captures = trial;
        Some(found)
    }

    fn count_nodes(&self) -> usize {
        1 + self.statics.values().map(Node::count_nodes).sum::<usize>()
            + self.dynamics.iter().map(|d| d.node.count_nodes()).sum::<usize>()
    }
}

/// The route tree shared by all methods.
pub(crate) struct RouteTrie<H> {
    root: Node<H>,
}

impl<H> RouteTrie<H> {
    pub(crate) fn new() -> Self {
        Self { root: Node::default() }
    }

    pub(crate) fn insert(&mut self, route: Arc<CompiledRoute<H>>) {
        // Cloning the segment list sidesteps borrowing `route` while moving it.
        let segments = route.segments().to_vec();
        self.root.insert(&segments, route);
    }

    /// Resolves a request path, returning the winning route and the captured
    /// values in path order.
    pub(crate) fn find<'p>(
        &self,
        method: Method,
        path: &'p str,
    ) -> Option<(Arc<CompiledRoute<H>>, Vec<Cow<'p, str>>)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut captures = Vec::with_capacity(segments.len());
        let route = self.root.find(method, &segments, &mut captures)?;
        Some((Arc::clone(route), captures))
    }

    pub(crate) fn node_count(&self) -> usize {
        self.root.count_nodes()
    }

    pub(crate) fn clear(&mut self) {
        self.root = Node::default();
    }
}
