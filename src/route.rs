//! Route registrations and match results.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::constraint::Constraint;
use crate::method::Method;
use crate::score::CompiledRoute;

/// One declared endpoint: a method, a path pattern and an opaque handler.
///
/// `H` is whatever the host application dispatches to: a boxed async
/// function, an enum of controller actions, a plain string. The router never
/// looks inside it.
///
/// Everything beyond method, path and handler is optional and set with
/// chained builder calls. Handlers state what they depend on explicitly,
/// nothing is inferred:
///
/// ```rust
/// use waymark::{ConstraintKind, Method, Route};
///
/// let route = Route::new(Method::Get, "/users/{id}", "users::show")
///     .with_name("users.show")
///     .with_constraint("id", ConstraintKind::Number)
///     .with_middleware("auth")
///     .with_dependency("database")
///     .with_meta("title", "User profile");
///
/// assert_eq!(route.name(), Some("users.show"));
/// assert_eq!(route.dependencies(), ["database"]);
/// ```
///
/// Once handed to [`Router::add_route`](crate::Router::add_route) a route is
/// never modified again.
#[derive(Clone, Debug)]
pub struct Route<H> {
    method: Method,
    path: String,
    handler: H,
    middleware: Vec<String>,
    constraints: HashMap<String, Constraint>,
    priority: Option<i64>,
    name: Option<String>,
    metadata: HashMap<String, String>,
    dependencies: Vec<String>,
}

impl<H> Route<H> {
    pub fn new(method: Method, path: impl Into<String>, handler: H) -> Self {
        Self {
            method,
            path: path.into(),
            handler,
            middleware: Vec::new(),
            constraints: HashMap::new(),
            priority: None,
            name: None,
            metadata: HashMap::new(),
            dependencies: Vec::new(),
        }
    }

    /// Names the route for [`Router::url_for`](crate::Router::url_for).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides the registration-order priority. Higher wins.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Appends a middleware reference. Order is preserved.
    pub fn with_middleware(mut self, middleware: impl Into<String>) -> Self {
        self.middleware.push(middleware.into());
        self
    }

    /// Declares a constraint for a `{name}` parameter of the path.
    ///
    /// An inline `{name:constraint}` in the path takes precedence.
    pub fn with_constraint(mut self, param: impl Into<String>, constraint: impl Into<Constraint>) -> Self {
        self.constraints.insert(param.into(), constraint.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Declares a dependency the handler needs (a database pool, a cache…).
    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn handler(&self) -> &H { &self.handler }
    pub fn middleware(&self) -> &[String] { &self.middleware }
    pub fn constraints(&self) -> &HashMap<String, Constraint> { &self.constraints }
    pub fn priority(&self) -> Option<i64> { self.priority }
    pub fn metadata(&self) -> &HashMap<String, String> { &self.metadata }
    pub fn dependencies(&self) -> &[String] { &self.dependencies }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn get_meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// A resolved lookup: the winning route and the parameters taken from the path.
///
/// Cloning is one `Arc` increment plus a copy of the parameter map, so the
/// match cache can hand out results freely.
pub struct MatchResult<H> {
    pub(crate) route: Arc<CompiledRoute<H>>,
    pub(crate) params: HashMap<String, String>,
}

impl<H> MatchResult<H> {
    /// The route as registered.
    pub fn route(&self) -> &Route<H> {
        self.route.route()
    }

    /// The route with its parsed segments and scores.
    pub fn compiled(&self) -> &Arc<CompiledRoute<H>> {
        &self.route
    }

    pub fn handler(&self) -> &H {
        self.route.route().handler()
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn into_params(self) -> HashMap<String, String> {
        self.params
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl<H> Clone for MatchResult<H> {
    fn clone(&self) -> Self {
        Self {
            route: Arc::clone(&self.route),
            params: self.params.clone(),
        }
    }
}

/// Equal when both results resolved to the same registered route with the
/// same parameters.
impl<H> PartialEq for MatchResult<H> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.route, &other.route) && self.params == other.params
    }
}

impl<H> fmt::Debug for MatchResult<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchResult")
            .field("method", &self.route.method())
            .field("path", &self.route.path())
            .field("params", &self.params)
            .finish()
    }
}
