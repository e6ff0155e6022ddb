//! Route table construction.

use std::fmt;
use std::sync::Arc;

use crate::args::{BoundArgs, Param};
use crate::error::{ApiError, Result};
use crate::method::{MethodMask, RouteFlags};
use crate::path::RoutePattern;
use crate::response::Reply;

/// What a handler returns: a reply to serialize, or a typed error.
pub type HandlerResult = std::result::Result<Reply, ApiError>;

/// A boxed handler callback. `C` is the per-request context, usually the
/// authenticated identity.
pub type Callback<C> = Arc<dyn Fn(&C, &BoundArgs) -> HandlerResult + Send + Sync>;

/// A handler bound to a route: callback, accepted methods, flags and the
/// declared parameter schema.
pub struct Handler<C> {
    name: String,
    methods: MethodMask,
    flags: RouteFlags,
    params: Vec<Param>,
    callback: Callback<C>,
}

impl<C> Clone for Handler<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            methods: self.methods,
            flags: self.flags,
            params: self.params.clone(),
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<C> fmt::Debug for Handler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("flags", &self.flags)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl<C> Handler<C> {
    /// Creates a handler with no parameters and no flags.
    pub fn new<F>(name: impl Into<String>, methods: MethodMask, callback: F) -> Self
    where
        F: Fn(&C, &BoundArgs) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            methods,
            flags: RouteFlags::NONE,
            params: Vec::new(),
            callback: Arc::new(callback),
        }
    }

    /// Declares the next parameter.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the handler flags.
    #[must_use]
    pub fn flags(mut self, flags: RouteFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns the handler name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the accepted methods.
    pub fn methods(&self) -> MethodMask {
        self.methods
    }

    /// Returns the handler flags.
    pub fn route_flags(&self) -> RouteFlags {
        self.flags
    }

    /// Returns the declared parameters.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// A handler can only be invoked if its parameter names are unique.
    pub(crate) fn is_invocable(&self) -> bool {
        self.params
            .iter()
            .enumerate()
            .all(|(i, p)| self.params[..i].iter().all(|q| q.name != p.name))
    }

    /// Invokes the callback.
    pub fn invoke(&self, ctx: &C, args: &BoundArgs) -> HandlerResult {
        (self.callback)(ctx, args)
    }
}

/// A compiled route: a pattern and its handlers, in registration order.
pub struct Route<C> {
    pub(crate) pattern: RoutePattern,
    pub(crate) handlers: Vec<Handler<C>>,
}

impl<C> Route<C> {
    /// Returns the route pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.pattern()
    }

    /// Returns the handlers.
    pub fn handlers(&self) -> &[Handler<C>] {
        &self.handlers
    }
}

/// A group of routes sharing a path prefix, registered by one resource.
pub struct RouteGroup<C> {
    prefix: String,
    routes: Vec<(String, Handler<C>)>,
}

impl<C> RouteGroup<C> {
    /// Creates a new route group with the given prefix.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            routes: Vec::new(),
        }
    }

    /// Adds a handler under `prefix + suffix`.
    #[must_use]
    pub fn route(mut self, suffix: &str, handler: Handler<C>) -> Self {
        self.routes
            .push((format!("{}{}", self.prefix, suffix), handler));
        self
    }

    /// Returns the routes in this group.
    pub fn into_routes(self) -> Vec<(String, Handler<C>)> {
        self.routes
    }
}

/// A resource that contributes routes at bootstrap.
pub trait Resource<C> {
    /// Returns the routes this resource serves, in match-priority order.
    fn routes(&self) -> RouteGroup<C>;
}

/// Collects routes before the immutable [`Router`] is built.
///
/// Registration order is match priority. A handler added under a pattern
/// that is already registered joins that route, keeping the route's
/// original position.
pub struct RouterBuilder<C> {
    entries: Vec<(String, Vec<Handler<C>>)>,
}

impl<C> Default for RouterBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> RouterBuilder<C> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a handler under a pattern.
    #[must_use]
    pub fn route(mut self, pattern: &str, handler: Handler<C>) -> Self {
        match self.entries.iter_mut().find(|(p, _)| p == pattern) {
            Some((_, handlers)) => handlers.push(handler),
            None => self.entries.push((pattern.to_string(), vec![handler])),
        }
        self
    }

    /// Registers a handler under a pattern at the front of the table.
    ///
    /// If the pattern is already registered, that route moves to the front
    /// and `handler` is tried before its existing handlers.
    #[must_use]
    pub fn route_first(mut self, pattern: &str, handler: Handler<C>) -> Self {
        let mut handlers = vec![handler];
        if let Some(pos) = self.entries.iter().position(|(p, _)| p == pattern) {
            let (_, existing) = self.entries.remove(pos);
            handlers.extend(existing);
        }
        self.entries.insert(0, (pattern.to_string(), handlers));
        self
    }

    /// Registers every route of a group.
    #[must_use]
    pub fn group(self, group: RouteGroup<C>) -> Self {
        group
            .into_routes()
            .into_iter()
            .fold(self, |builder, (pattern, handler)| {
                builder.route(&pattern, handler)
            })
    }

    /// Registers every route of a resource.
    #[must_use]
    pub fn resource(self, resource: &impl Resource<C>) -> Self {
        self.group(resource.routes())
    }

    /// Compiles every pattern and freezes the table.
    pub fn build(self) -> Result<Router<C>> {
        let routes = self
            .entries
            .into_iter()
            .map(|(pattern, handlers)| {
                Ok(Route {
                    pattern: RoutePattern::new(&pattern)?,
                    handlers,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Router { routes })
    }
}

/// One entry of the route listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescription {
    /// The route pattern.
    pub pattern: String,
    /// Verbs accepted by the visible handlers.
    pub supports: Vec<&'static str>,
    /// Whether any visible handler parses the request body.
    pub accepts_data: bool,
}

/// An immutable route table.
///
/// Dispatch never mutates it, so a router can be shared across threads.
/// First match wins: a general pattern registered before a more specific
/// one makes the latter unreachable for the methods they share.
pub struct Router<C> {
    pub(crate) routes: Vec<Route<C>>,
}

impl<C> Router<C> {
    /// Returns the routes in match-priority order.
    pub fn routes(&self) -> &[Route<C>] {
        &self.routes
    }

    /// Lists routes with their supported verbs, skipping hidden handlers.
    ///
    /// A route whose handlers are all hidden is left out.
    pub fn describe(&self) -> Vec<RouteDescription> {
        self.routes
            .iter()
            .filter_map(|route| {
                let visible: Vec<_> = route
                    .handlers
                    .iter()
                    .filter(|h| !h.flags.contains(RouteFlags::HIDDEN_ENDPOINT))
                    .collect();
                if visible.is_empty() {
                    return None;
                }

                let mut supports = Vec::new();
                for verb in visible.iter().flat_map(|h| h.methods.verbs()) {
                    if !supports.contains(&verb) {
                        supports.push(verb);
                    }
                }

                Some(RouteDescription {
                    pattern: route.pattern().to_string(),
                    supports,
                    accepts_data: visible
                        .iter()
                        .any(|h| h.flags.contains(RouteFlags::ACCEPT_DATA)),
                })
            })
            .collect()
    }
}
