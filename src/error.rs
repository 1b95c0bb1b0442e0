//! Unified error types.

/// The error type returned by waymark's fallible operations.
///
/// A request path that matches no route is not an error: lookups return
/// `None` and the caller decides what a miss means (usually a 404). This type
/// surfaces registration and configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),
}

/// A route path that cannot be compiled.
///
/// Raised by [`Router::add_route`](crate::Router::add_route) before anything
/// is inserted, so a rejected route leaves the router untouched.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("unbalanced braces in route `{path}`")]
    UnbalancedBraces { path: String },

    #[error("empty parameter name in route `{path}`")]
    EmptyParamName { path: String },

    #[error("invalid parameter name `{name}` in route `{path}`")]
    InvalidParamName { path: String, name: String },

    #[error("parameter `{name}` appears more than once in route `{path}`")]
    DuplicateParam { path: String, name: String },

    #[error("wildcard `{name}` must be the last segment of route `{path}`")]
    WildcardNotLast { path: String, name: String },

    #[error("segment `{segment}` mixes literal text with a parameter in route `{path}`")]
    MixedSegment { path: String, segment: String },

    #[error("parameter `{name}` has an empty constraint in route `{path}`")]
    EmptyConstraint { path: String, name: String },

    #[error("constraint for `{name}` requires a `/`, but a parameter matches a single segment of route `{path}`")]
    SlashInConstraint { path: String, name: String },

    #[error("invalid pattern for parameter `{name}`: {source}")]
    InvalidRegex {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("constraint declared for `{name}`, which is not a single-segment parameter of route `{path}`")]
    UnknownConstraintParam { path: String, name: String },
}
