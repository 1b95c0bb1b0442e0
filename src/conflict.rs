//! Static route conflict analysis.
//!
//! Pure diagnostics for tooling: looks at every pair of routes registered
//! under the same method and reports the ones a request could hit both of.
//! Nothing here runs on the lookup path, and conflicts never block
//! registration: the trie's ordering already decides every tie.
//!
//! | Kind | When | Severity |
//! |---|---|---|
//! | `duplicate` | identical path text | high |
//! | `ambiguous` | paths overlap, priorities within the window | medium |
//! | `overlap` | paths overlap, priorities clearly apart | medium if equally specific, else low |

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::method::Method;
use crate::score::CompiledRoute;
use crate::segment::Segment;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    Duplicate,
    Ambiguous,
    Overlap,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A pair of routes that can both match some request.
///
/// `routes[0]` was registered before `routes[1]`.
#[derive(Debug)]
pub struct Conflict<H> {
    pub routes: [Arc<CompiledRoute<H>>; 2],
    pub kind: ConflictKind,
    pub severity: Severity,
}

impl<H> Conflict<H> {
    /// A handler-free, serialisable view for reports.
    pub fn summary(&self) -> ConflictSummary {
        let [a, b] = &self.routes;
        ConflictSummary {
            method: a.method(),
            paths: [a.path().to_owned(), b.path().to_owned()],
            kind: self.kind,
            severity: self.severity,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ConflictSummary {
    pub method: Method,
    pub paths: [String; 2],
    pub kind: ConflictKind,
    pub severity: Severity,
}

/// Finds every conflicting pair, grouped by method, in registration order.
///
/// `ambiguity_window` is the priority distance below which an overlap counts
/// as ambiguous.
pub fn analyze<H>(routes: &[Arc<CompiledRoute<H>>], ambiguity_window: i64) -> Vec<Conflict<H>> {
    let mut by_method: BTreeMap<Method, Vec<&Arc<CompiledRoute<H>>>> = BTreeMap::new();
    for route in routes {
        by_method.entry(route.method()).or_default().push(route);
    }

    let mut conflicts = Vec::new();
    for group in by_method.values_mut() {
        group.sort_by_key(|r| r.sequence());
        for (i, a) in group.iter().enumerate() {
            for b in &group[i + 1..] {
                if let Some((kind, severity)) = classify(a, b, ambiguity_window) {
                    conflicts.push(Conflict {
                        routes: [Arc::clone(a), Arc::clone(b)],
                        kind,
                        severity,
                    });
                }
            }
        }
    }
    conflicts
}

fn classify<H>(
    a: &CompiledRoute<H>,
    b: &CompiledRoute<H>,
    ambiguity_window: i64,
) -> Option<(ConflictKind, Severity)> {
    if a.path() == b.path() {
        return Some((ConflictKind::Duplicate, Severity::High));
    }
    if !overlaps(a.segments(), b.segments()) {
        return None;
    }
    if (a.priority() - b.priority()).abs() < ambiguity_window {
        return Some((ConflictKind::Ambiguous, Severity::Medium));
    }
    let severity = if a.static_score() == b.static_score() {
        Severity::Medium
    } else {
        Severity::Low
    };
    Some((ConflictKind::Overlap, severity))
}

/// True when some request path satisfies both segment lists.
pub fn overlaps(a: &[Segment], b: &[Segment]) -> bool {
    match (a.split_first(), b.split_first()) {
        (None, None) => true,
        // A wildcard swallows one or more segments of anything.
        (Some((Segment::Wildcard(_), _)), _) => !b.is_empty(),
        (_, Some((Segment::Wildcard(_), _))) => !a.is_empty(),
        (Some((x, rest_a)), Some((y, rest_b))) => segments_overlap(x, y) && overlaps(rest_a, rest_b),
        _ => false,
    }
}

fn segments_overlap(a: &Segment, b: &Segment) -> bool {
    match (a, b) {
        (Segment::Static(x), Segment::Static(y)) => x == y,
        (Segment::Static(text), Segment::ConstrainedParam(_, c))
        | (Segment::ConstrainedParam(_, c), Segment::Static(text)) => c.matches(text),
        (Segment::ConstrainedParam(_, x), Segment::ConstrainedParam(_, y)) => !x.is_disjoint(y),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Route;
    use crate::segment::parse_path;

    fn compiled(routes: &[(Method, &str)]) -> Vec<Arc<CompiledRoute<()>>> {
        routes
            .iter()
            .enumerate()
            .map(|(i, (m, p))| Arc::new(CompiledRoute::compile(Route::new(*m, *p, ()), i as u64).unwrap()))
            .collect()
    }

    fn overlap(a: &str, b: &str) -> bool {
        overlaps(&parse_path(a).unwrap(), &parse_path(b).unwrap())
    }

    #[test]
    fn structural_overlap() {
        assert!(overlap("/users/{id}", "/users/create"));
        assert!(overlap("/users/{id:number}", "/users/42"));
        assert!(!overlap("/users/{id:number}", "/users/create"));
        assert!(!overlap("/a/{x:number}", "/a/{y:alpha}"));
        assert!(overlap("/files/{*rest}", "/files/a/b"));
        assert!(!overlap("/files/{*rest}", "/files"));
        assert!(!overlap("/a/b", "/a/c"));
        assert!(!overlap("/a", "/a/b"));
    }

    #[test]
    fn duplicate_is_high() {
        let routes = compiled(&[(Method::Get, "/x/{id}"), (Method::Get, "/x/{id}")]);
        let conflicts = analyze(&routes, 10);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Duplicate);
        assert_eq!(conflicts[0].severity, Severity::High);
    }

    #[test]
    fn methods_are_analysed_separately() {
        let routes = compiled(&[(Method::Get, "/x/{id}"), (Method::Post, "/x/{id}")]);
        assert!(analyze(&routes, 10).is_empty());
    }

    #[test]
    fn close_priorities_are_ambiguous() {
        let routes = compiled(&[(Method::Get, "/users/{id}"), (Method::Get, "/users/create")]);
        let conflicts = analyze(&routes, 10);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Ambiguous);
        assert_eq!(conflicts[0].severity, Severity::Medium);
    }

    #[test]
    fn separated_priorities_are_overlaps() {
        let routes = vec![
            Arc::new(CompiledRoute::compile(Route::new(Method::Get, "/users/{id}", ()), 0).unwrap()),
            Arc::new(
                CompiledRoute::compile(Route::new(Method::Get, "/users/create", ()).with_priority(100), 1)
                    .unwrap(),
            ),
            Arc::new(
                CompiledRoute::compile(Route::new(Method::Get, "/users/{name:alpha}", ()).with_priority(-50), 2)
                    .unwrap(),
            ),
        ];
        let conflicts: Vec<_> = analyze(&routes, 10).iter().map(Conflict::summary).collect();
        assert_eq!(conflicts.len(), 3);
        assert_eq!(conflicts[0].paths, ["/users/{id}".to_owned(), "/users/create".to_owned()]);
        assert_eq!((conflicts[0].kind, conflicts[0].severity), (ConflictKind::Overlap, Severity::Low));
        assert_eq!((conflicts[1].kind, conflicts[1].severity), (ConflictKind::Overlap, Severity::Medium));
        assert_eq!((conflicts[2].kind, conflicts[2].severity), (ConflictKind::Overlap, Severity::Low));
    }

    #[test]
    fn disjoint_routes_are_silent() {
        let routes = compiled(&[(Method::Get, "/a"), (Method::Get, "/b"), (Method::Get, "/a/{id}")]);
        assert!(analyze(&routes, 10).is_empty());
    }

    #[test]
    fn summary_serialises() {
        let routes = compiled(&[(Method::Get, "/x"), (Method::Get, "/x")]);
        let json = serde_json::to_value(analyze(&routes, 10)[0].summary()).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["kind"], "duplicate");
        assert_eq!(json["severity"], "high");
    }
}
