//! Parameter constraints.
//!
//! A constraint narrows what one path segment may contain. The common cases
//! are a closed set of keywords, checked by hand without touching the regex
//! engine; anything else is a raw regex fragment anchored to the whole
//! segment.
//!
//! ```text
//! /users/{id:number}          keyword
//! /posts/{slug:slug}          keyword
//! /v/{code:[A-Z]{3}}          raw regex, compiled as ^(?:[A-Z]{3})$
//! ```
//!
//! A constraint only ever sees one segment, so a pattern with a literal `/`
//! outside a character class is rejected at registration. Inside a class
//! (`[^/]+`) a slash is fine.

use std::fmt;

use regex::Regex;

use crate::error::PatternError;

/// The built-in constraint keywords.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ConstraintKind {
    /// One or more ASCII digits.
    Number,
    /// One or more ASCII letters.
    Alpha,
    /// One or more ASCII letters or digits.
    Alphanumeric,
    /// A hyphenated UUID, `8-4-4-4-12` hex digits, either case.
    Uuid,
    /// Lowercase letters and digits in runs joined by single hyphens.
    Slug,
}

impl ConstraintKind {
    /// Looks up a keyword as written inside `{name:keyword}`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "number"       => Some(Self::Number),
            "alpha"        => Some(Self::Alpha),
            "alphanumeric" => Some(Self::Alphanumeric),
            "uuid"         => Some(Self::Uuid),
            "slug"         => Some(Self::Slug),
            _              => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number       => "number",
            Self::Alpha        => "alpha",
            Self::Alphanumeric => "alphanumeric",
            Self::Uuid         => "uuid",
            Self::Slug         => "slug",
        }
    }

    pub fn matches(self, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        match self {
            Self::Number       => value.bytes().all(|b| b.is_ascii_digit()),
            Self::Alpha        => value.bytes().all(|b| b.is_ascii_alphabetic()),
            Self::Alphanumeric => value.bytes().all(|b| b.is_ascii_alphanumeric()),
            Self::Uuid         => is_uuid(value),
            Self::Slug         => is_slug(value),
        }
    }
}

fn is_uuid(value: &str) -> bool {
    value.len() == 36
        && value.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

fn is_slug(value: &str) -> bool {
    value
        .split('-')
        .all(|run| !run.is_empty() && run.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()))
}

/// True when `source` has a `/` (escaped or not) outside `[...]`.
fn has_bare_slash(source: &str) -> bool {
    let mut class = false;
    let mut escaped = false;
    for c in source.chars() {
        match c {
            _ if escaped => {
                if c == '/' && !class {
                    return true;
                }
                escaped = false;
            }
            '\\' => escaped = true,
            '[' => class = true,
            ']' => class = false,
            '/' if !class => return true,
            _ => {}
        }
    }
    false
}

/// A constraint attached to a path parameter.
#[derive(Clone, Debug)]
pub enum Constraint {
    Kind(ConstraintKind),
    /// A raw regex fragment. `source` is the fragment as written; `regex` is
    /// the compiled, anchored form.
    Pattern { source: String, regex: Regex },
}

impl Constraint {
    /// Compiles a raw regex fragment, anchored to the whole segment.
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self::Pattern { source: source.to_owned(), regex })
    }

    /// Parses the text after the colon in `{name:constraint}`: a keyword if one
    /// matches, a raw regex otherwise.
    pub(crate) fn parse(name: &str, spec: &str, path: &str) -> Result<Self, PatternError> {
        if spec.is_empty() {
            return Err(PatternError::EmptyConstraint {
                path: path.to_owned(),
                name: name.to_owned(),
            });
        }
        if let Some(kind) = ConstraintKind::from_keyword(spec) {
            return Ok(Self::Kind(kind));
        }
        let constraint = Self::pattern(spec).map_err(|source| PatternError::InvalidRegex {
            name: name.to_owned(),
            source,
        })?;
        constraint.check_single_segment(name, path)?;
        Ok(constraint)
    }

    /// Rejects a raw pattern with a `/` outside any character class.
    pub(crate) fn check_single_segment(&self, name: &str, path: &str) -> Result<(), PatternError> {
        match self {
            Self::Pattern { source, .. } if has_bare_slash(source) => Err(PatternError::SlashInConstraint {
                path: path.to_owned(),
                name: name.to_owned(),
            }),
            _ => Ok(()),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Kind(kind) => kind.matches(value),
            Self::Pattern { regex, .. } => regex.is_match(value),
        }
    }

    /// The constraint as written in a route path.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Kind(kind) => kind.as_str(),
            Self::Pattern { source, .. } => source,
        }
    }

    /// True when no segment can satisfy both constraints.
    ///
    /// Only the keyword pairs that are provably disjoint answer `true`; raw
    /// patterns are assumed to overlap with everything.
    pub(crate) fn is_disjoint(&self, other: &Constraint) -> bool {
        use ConstraintKind::*;
        matches!(
            (self, other),
            (Self::Kind(Number), Self::Kind(Alpha)) | (Self::Kind(Alpha), Self::Kind(Number))
        )
    }
}

impl From<ConstraintKind> for Constraint {
    fn from(kind: ConstraintKind) -> Self {
        Self::Kind(kind)
    }
}

/// Two constraints are equal when they are written the same way.
impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Kind(a), Self::Kind(b)) => a == b,
            (Self::Pattern { source: a, .. }, Self::Pattern { source: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Constraint {}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
