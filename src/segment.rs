//! Route path parsing.
//!
//! Turns a declared path such as `/users/{id:number}/files/{*rest}` into an
//! ordered list of typed [`Segment`]s. All validation happens here, at
//! registration time, so the matcher never has to deal with a malformed
//! pattern.
//!
//! Splitting on `/` only happens outside braces, which lets a raw regex
//! constraint carry quantifiers: `{code:[a-z]{2,4}}`. A constraint still
//! matches exactly one request segment, so a `/` it would require is an
//! error.

use std::collections::{HashMap, HashSet};

use crate::constraint::Constraint;
use crate::error::PatternError;

/// One `/`-delimited unit of a route path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, matched exactly.
    Static(String),
    /// `{name}`, any non-empty segment.
    Param(String),
    /// `{name:constraint}`, a segment the constraint accepts.
    ConstrainedParam(String, Constraint),
    /// `{*name}` or `{name...}`, the rest of the path. Always last.
    Wildcard(String),
}

impl Segment {
    /// The parameter name, or `None` for a static segment.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Self::Static(_) => None,
            Self::Param(name) | Self::ConstrainedParam(name, _) | Self::Wildcard(name) => Some(name),
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

/// Parses a route path into segments.
///
/// `/` (or an empty string) yields no segments and addresses the root.
pub fn parse_path(path: &str) -> Result<Vec<Segment>, PatternError> {
    let segments = split_pieces(path)?
        .into_iter()
        .map(|piece| classify(piece, path))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    for (i, segment) in segments.iter().enumerate() {
        let Some(name) = segment.param_name() else { continue };
        if !seen.insert(name) {
            return Err(PatternError::DuplicateParam {
                path: path.to_owned(),
                name: name.to_owned(),
            });
        }
        if matches!(segment, Segment::Wildcard(_)) && i + 1 != segments.len() {
            return Err(PatternError::WildcardNotLast {
                path: path.to_owned(),
                name: name.to_owned(),
            });
        }
    }

    Ok(segments)
}

/// Applies constraints declared next to the route rather than inline.
///
/// A declared constraint upgrades a plain `{name}` parameter. An inline
/// constraint already on the segment wins. Naming anything other than a
/// single-segment parameter is an error.
pub(crate) fn apply_declared(
    segments: &mut [Segment],
    declared: &HashMap<String, Constraint>,
    path: &str,
) -> Result<(), PatternError> {
    for (name, constraint) in declared {
        let slot = segments.iter_mut().find(|s| match s {
            Segment::Param(n) | Segment::ConstrainedParam(n, _) => n == name,
            _ => false,
        });
        match slot {
            Some(segment) if matches!(segment, Segment::Param(_)) => {
                constraint.check_single_segment(name, path)?;
                *segment = Segment::ConstrainedParam(name.clone(), constraint.clone());
            }
            Some(_) => {}
            None => {
                return Err(PatternError::UnknownConstraintParam {
                    path: path.to_owned(),
                    name: name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Splits on `/` at brace depth zero and drops empty pieces.
fn split_pieces(path: &str) -> Result<Vec<&str>, PatternError> {
    let unbalanced = || PatternError::UnbalancedBraces { path: path.to_owned() };

    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, b) in path.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            b'/' if depth == 0 => {
                pieces.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced());
    }
    pieces.push(&path[start..]);
    pieces.retain(|p| !p.is_empty());
    Ok(pieces)
}

fn classify(piece: &str, path: &str) -> Result<Segment, PatternError> {
    if !piece.contains(['{', '}']) {
        return Ok(Segment::Static(piece.to_owned()));
    }
    if !piece.starts_with('{') || closing_brace(piece) != Some(piece.len() - 1) {
        return Err(PatternError::MixedSegment {
            path: path.to_owned(),
            segment: piece.to_owned(),
        });
    }

    let inner = &piece[1..piece.len() - 1];

    if let Some(name) = inner.strip_prefix('*').or_else(|| inner.strip_suffix("...")) {
        validate_name(name, path)?;
        return Ok(Segment::Wildcard(name.to_owned()));
    }

    match inner.split_once(':') {
        Some((name, spec)) => {
            validate_name(name, path)?;
            let constraint = Constraint::parse(name, spec, path)?;
            Ok(Segment::ConstrainedParam(name.to_owned(), constraint))
        }
        None => {
            validate_name(inner, path)?;
            Ok(Segment::Param(inner.to_owned()))
        }
    }
}

/// Byte index of the brace closing the one at index 0.
fn closing_brace(piece: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in piece.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn validate_name(name: &str, path: &str) -> Result<(), PatternError> {
    if name.is_empty() {
        return Err(PatternError::EmptyParamName { path: path.to_owned() });
    }
    if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(PatternError::InvalidParamName {
            path: path.to_owned(),
            name: name.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintKind;

    fn stat(s: &str) -> Segment {
        Segment::Static(s.to_owned())
    }

    #[test]
    fn root_has_no_segments() {
        assert!(parse_path("/").unwrap().is_empty());
        assert!(parse_path("").unwrap().is_empty());
    }

    #[test]
    fn static_and_params() {
        let segs = parse_path("/users/{id}/posts").unwrap();
        assert_eq!(segs, vec![stat("users"), Segment::Param("id".into()), stat("posts")]);
    }

    #[test]
    fn empty_pieces_are_ignored() {
        assert_eq!(parse_path("//a///b/").unwrap(), vec![stat("a"), stat("b")]);
    }

    #[test]
    fn keyword_constraint() {
        let segs = parse_path("/users/{id:number}").unwrap();
        assert_eq!(
            segs[1],
            Segment::ConstrainedParam("id".into(), Constraint::Kind(ConstraintKind::Number))
        );
    }

    #[test]
    fn regex_constraint_may_contain_braces() {
        let segs = parse_path("/v/{code:[a-z]{2,4}}/{id:[^/]{3}}").unwrap();
        assert_eq!(segs.len(), 3);
        match &segs[1] {
            Segment::ConstrainedParam(name, c) => {
                assert_eq!(name, "code");
                assert!(c.matches("abc"));
                assert!(!c.matches("abcde"));
            }
            other => panic!("unexpected segment {other:?}"),
        }
    }

    #[test]
    fn constraint_spanning_segments() {
        let err = parse_path("/v/{date:\\d{4}/\\d{2}}").unwrap_err();
        assert!(matches!(err, PatternError::SlashInConstraint { ref name, .. } if name == "date"));

        let mut segs = parse_path("/v/{date}").unwrap();
        let declared = HashMap::from([("date".to_owned(), Constraint::pattern("\\d+/\\d+").unwrap())]);
        let err = apply_declared(&mut segs, &declared, "/v/{date}").unwrap_err();
        assert!(matches!(err, PatternError::SlashInConstraint { .. }));
    }

    #[test]
    fn both_wildcard_spellings() {
        assert_eq!(parse_path("/files/{*rest}").unwrap()[1], Segment::Wildcard("rest".into()));
        assert_eq!(parse_path("/files/{rest...}").unwrap()[1], Segment::Wildcard("rest".into()));
    }

    #[test]
    fn unbalanced_braces() {
        assert!(matches!(parse_path("/users/{id"), Err(PatternError::UnbalancedBraces { .. })));
        assert!(matches!(parse_path("/users/id}"), Err(PatternError::UnbalancedBraces { .. })));
    }

    #[test]
    fn empty_and_invalid_names() {
        assert!(matches!(parse_path("/users/{}"), Err(PatternError::EmptyParamName { .. })));
        assert!(matches!(parse_path("/users/{:number}"), Err(PatternError::EmptyParamName { .. })));
        assert!(matches!(parse_path("/files/{*}"), Err(PatternError::EmptyParamName { .. })));
        assert!(matches!(
            parse_path("/users/{user id}"),
            Err(PatternError::InvalidParamName { .. })
        ));
    }

    #[test]
    fn duplicate_param() {
        let err = parse_path("/a/{id}/b/{id:number}").unwrap_err();
        assert!(matches!(err, PatternError::DuplicateParam { ref name, .. } if name == "id"));
    }

    #[test]
    fn wildcard_must_be_last() {
        let err = parse_path("/files/{*rest}/edit").unwrap_err();
        assert!(matches!(err, PatternError::WildcardNotLast { .. }));
        let err = parse_path("/{*a}/{*b}").unwrap_err();
        assert!(matches!(err, PatternError::WildcardNotLast { ref name, .. } if name == "a"));
    }

    #[test]
    fn mixed_segment() {
        assert!(matches!(parse_path("/v{id}"), Err(PatternError::MixedSegment { .. })));
        assert!(matches!(parse_path("/{a}{b}"), Err(PatternError::MixedSegment { .. })));
    }

    #[test]
    fn declared_constraint_upgrades_plain_param() {
        let mut segs = parse_path("/users/{id}").unwrap();
        let declared = HashMap::from([("id".to_owned(), Constraint::from(ConstraintKind::Uuid))]);
        apply_declared(&mut segs, &declared, "/users/{id}").unwrap();
        assert_eq!(
            segs[1],
            Segment::ConstrainedParam("id".into(), Constraint::Kind(ConstraintKind::Uuid))
        );
    }

    #[test]
    fn inline_constraint_wins_over_declared() {
        let mut segs = parse_path("/users/{id:number}").unwrap();
        let declared = HashMap::from([("id".to_owned(), Constraint::from(ConstraintKind::Uuid))]);
        apply_declared(&mut segs, &declared, "/users/{id:number}").unwrap();
        assert_eq!(
            segs[1],
            Segment::ConstrainedParam("id".into(), Constraint::Kind(ConstraintKind::Number))
        );
    }

    #[test]
    fn declared_constraint_for_unknown_param() {
        let mut segs = parse_path("/files/{*rest}").unwrap();
        let declared = HashMap::from([("rest".to_owned(), Constraint::from(ConstraintKind::Slug))]);
        let err = apply_declared(&mut segs, &declared, "/files/{*rest}").unwrap_err();
        assert!(matches!(err, PatternError::UnknownConstraintParam { .. }));
    }
}
