//! Route registration and lookup.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Look up the first route accepting the request's method and path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(n) scan in registration order; earlier routes shadow later ones
//! - A method mismatch is indistinguishable from no match at all

use std::sync::Arc;

use thiserror::Error;

use crate::http::request::{Method, Request};
use crate::http::response::Reply;
use crate::routing::matcher::{Params, PathPattern, PatternError};

/// Failure raised by a handler. The connection is closed without a response.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(String),

    /// Failure of a collaborator the handler depends on.
    #[error("{0}")]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Anything that can turn a matched request into a reply.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request, params: &Params) -> Result<Reply, HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&Request, &Params) -> Result<Reply, HandlerError> + Send + Sync,
{
    fn handle(&self, request: &Request, params: &Params) -> Result<Reply, HandlerError> {
        self(request, params)
    }
}

/// A registered route.
pub struct Route {
    pattern: PathPattern,
    methods: Vec<Method>,
    handler: Arc<dyn Handler>,
}

impl Route {
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// A successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: Params,
}

impl RouteMatch<'_> {
    pub fn invoke(&self, request: &Request) -> Result<Reply, HandlerError> {
        self.route.handler().handle(request, &self.params)
    }
}

/// Ordered route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. An empty method list means GET only.
    pub fn register<H>(
        &mut self,
        pattern: &str,
        methods: &[Method],
        handler: H,
    ) -> Result<&mut Self, PatternError>
    where
        H: Handler + 'static,
    {
        let pattern = PathPattern::parse(pattern)?;
        let methods = if methods.is_empty() {
            vec![Method::Get]
        } else {
            methods.to_vec()
        };

        tracing::debug!(
            pattern = %pattern,
            methods = ?methods.iter().map(Method::as_str).collect::<Vec<_>>(),
            position = self.routes.len(),
            "Route registered"
        );

        self.routes.push(Route {
            pattern,
            methods,
            handler: Arc::new(handler),
        });
        Ok(self)
    }

    pub fn get<H>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError>
    where
        H: Handler + 'static,
    {
        self.register(pattern, &[Method::Get], handler)
    }

    pub fn post<H>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, PatternError>
    where
        H: Handler + 'static,
    {
        self.register(pattern, &[Method::Post], handler)
    }

    /// First route, in registration order, accepting this method and path.
    pub fn match_request(&self, request: &Request) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.allows(request.method()))
            .find_map(|route| {
                route
                    .pattern
                    .matches(request.path())
                    .map(|params| RouteMatch { route, params })
            })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
