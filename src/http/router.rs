//! Route table and handler-chain execution.
//!
//! Routes are matched in registration order. A pattern such as
//! `/users/:id` is split on `/`; a path matches when it has the same number
//! of segments, every literal segment is equal, and every `:name` segment
//! captures the corresponding path segment (which may be empty).

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseError};

/// What a handler asks the chain to do after it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Run the next handler in the chain.
    Continue,
    /// Stop here. The handler is expected to have sent the response.
    Halt,
}

/// Outcome of [`Router::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler sent the response.
    Sent,
    /// No route matched; the caller answers with `404 Not Found`.
    NotFound,
    /// A route matched but its chain finished without sending anything.
    Unanswered,
}

/// Path parameters captured by a route pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.0
    }
}

/// A request together with the parameters its route captured.
///
/// Derefs to [`Request`].
pub struct RequestContext<'a> {
    request: &'a Request,
    params: &'a PathParams,
}

impl<'a> RequestContext<'a> {
    pub fn new(request: &'a Request, params: &'a PathParams) -> Self {
        Self { request, params }
    }

    pub fn request(&self) -> &Request {
        self.request
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &PathParams {
        self.params
    }
}

impl Deref for RequestContext<'_> {
    type Target = Request;

    fn deref(&self) -> &Request {
        self.request
    }
}

/// One link of a handler chain.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn call(&self, req: &RequestContext<'_>, res: &mut Response) -> Result<Next, ResponseError>;
}

pub type BoxedHandler = Arc<dyn Handler>;

pub fn boxed<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(handler)
}

/// A synchronous closure used as a handler. See [`from_fn`].
pub struct FnHandler<F>(F);

/// Wraps a closure as a [`Handler`].
pub fn from_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&RequestContext<'_>, &mut Response) -> Result<Next, ResponseError> + Send + Sync + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(&RequestContext<'_>, &mut Response) -> Result<Next, ResponseError> + Send + Sync + 'static,
{
    async fn call(&self, req: &RequestContext<'_>, res: &mut Response) -> Result<Next, ResponseError> {
        (self.0)(req, res)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

pub struct Route {
    method: Method,
    pattern: String,
    segments: Vec<Segment>,
    handlers: Vec<BoxedHandler>,
}

impl Route {
    fn new(method: Method, pattern: String, handlers: Vec<BoxedHandler>) -> Self {
        let segments = pattern
            .split('/')
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();

        Self {
            method,
            pattern,
            segments,
            handlers,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn handlers(&self) -> &[BoxedHandler] {
        &self.handlers
    }

    fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }

        Some(PathParams(params))
    }
}

/// A matched route and the parameters it captured.
pub struct RouteMatch<'r> {
    pub route: &'r Route,
    pub params: PathParams,
}

impl RouteMatch<'_> {
    pub fn handlers(&self) -> &[BoxedHandler] {
        self.route.handlers()
    }
}

/// The route table.
///
/// Built once at startup and then shared read-only (usually as
/// `Arc<Router>`) by every connection.
#[derive(Default)]
pub struct Router {
    prefix: String,
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// A router whose patterns are all registered below `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            routes: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Registers a handler chain for `method` and `pattern`.
    pub fn route(&mut self, method: Method, pattern: &str, handlers: Vec<BoxedHandler>) -> &mut Self {
        let pattern = join_prefix(&self.prefix, pattern);
        debug!(%method, %pattern, handlers = handlers.len(), "Registered route");
        self.routes.push(Route::new(method, pattern, handlers));
        self
    }

    pub fn get(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::GET, pattern, vec![boxed(handler)])
    }

    pub fn post(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::POST, pattern, vec![boxed(handler)])
    }

    pub fn put(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::PUT, pattern, vec![boxed(handler)])
    }

    pub fn delete(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.route(Method::DELETE, pattern, vec![boxed(handler)])
    }

    /// Finds the first registered route matching `method` and `path`.
    pub fn at(&self, method: Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| route.matches(path).map(|params| RouteMatch { route, params }))
    }

    /// Matches `req` and runs the matched handler chain against `res`.
    ///
    /// Handlers run one after another. The chain stops as soon as the
    /// response has been sent or a handler returns [`Next::Halt`].
    pub async fn dispatch(&self, req: &Request, res: &mut Response) -> Result<Dispatch, ResponseError> {
        let Some(matched) = self.at(req.method, &req.path) else {
            debug!(method = %req.method, path = %req.path, "No route matched");
            return Ok(Dispatch::NotFound);
        };

        let cx = RequestContext::new(req, &matched.params);

        for handler in matched.handlers() {
            let next = handler.call(&cx, res).await?;

            if res.is_sent() {
                return Ok(Dispatch::Sent);
            }
            if next == Next::Halt {
                break;
            }
        }

        warn!(
            method = %req.method,
            path = %req.path,
            route = matched.route.pattern(),
            "Handler chain ended without sending a response"
        );
        Ok(Dispatch::Unanswered)
    }
}

fn join_prefix(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let pattern = pattern.trim_start_matches('/');

    if prefix.is_empty() {
        format!("/{pattern}")
    } else if pattern.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}/{pattern}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_joining() {
        assert_eq!(join_prefix("", "/echo/:msg"), "/echo/:msg");
        assert_eq!(join_prefix("/api/", "/users"), "/api/users");
        assert_eq!(join_prefix("/api", "users"), "/api/users");
        assert_eq!(join_prefix("", "/"), "/");
        assert_eq!(join_prefix("/api", "/"), "/api");
    }
}
