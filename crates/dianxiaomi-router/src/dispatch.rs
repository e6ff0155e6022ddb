//! Request dispatch: match, gather arguments, bind, invoke.

use tracing::debug;

use crate::args::{bind, url_decode, ArgValue, ArgumentBag, BoundArgs};
use crate::codec::parse_body;
use crate::error::DispatchError;
use crate::method::{Method, RouteFlags};
use crate::request::Request;
use crate::response::Reply;
use crate::router::{Handler, Route, Router};

/// Keys the dispatcher injects into every argument bag.
pub const RESERVED_KEYS: [&str; 5] = ["_method", "_route", "_path", "_headers", "_files"];

/// The outcome of matching a request, before the handler runs.
pub struct Resolved<'a, C> {
    /// The matched route.
    pub route: &'a Route<C>,
    /// The matched handler.
    pub handler: &'a Handler<C>,
    /// The merged argument bag.
    pub bag: ArgumentBag,
    /// Arguments bound to the handler's declared parameters.
    pub args: BoundArgs,
}

impl<C> Resolved<'_, C> {
    /// Invokes the matched handler. Handler errors pass through unchanged.
    pub fn invoke(&self, ctx: &C) -> Result<Reply, DispatchError> {
        self.handler.invoke(ctx, &self.args).map_err(DispatchError::Handler)
    }
}

impl<C> Router<C> {
    /// Finds the handler for a request and binds its arguments.
    ///
    /// Routes are tried in registration order and, within a route, handlers
    /// in registration order. The first handler whose method mask contains
    /// the request method and whose pattern matches the decoded path wins.
    pub fn resolve(&self, request: &Request) -> Result<Resolved<'_, C>, DispatchError> {
        let method =
            Method::parse(&request.method).ok_or_else(|| DispatchError::UnsupportedMethod {
                method: request.method.clone(),
            })?;
        let path = normalize_path(&request.path);

        for route in &self.routes {
            for handler in &route.handlers {
                if !handler.methods().contains(method.bit()) {
                    continue;
                }
                let Some(captures) = route.pattern.match_path(&path) else {
                    continue;
                };

                debug!(
                    method = %method,
                    path = %path,
                    route = route.pattern(),
                    handler = handler.name(),
                    "matched route"
                );

                if !handler.is_invocable() {
                    return Err(DispatchError::InvalidHandler {
                        route: route.pattern().to_string(),
                    });
                }

                let bag = build_bag(request, method, &path, route, handler, captures);
                let args = bind(handler.params(), &bag)?;
                return Ok(Resolved {
                    route,
                    handler,
                    bag,
                    args,
                });
            }
        }

        debug!(method = %method, path = %path, "no matching route");
        Err(DispatchError::NoRoute {
            method: method.as_str().to_string(),
            path,
        })
    }

    /// Resolves a request and invokes the matched handler with `ctx`.
    pub fn dispatch(&self, ctx: &C, request: &Request) -> Result<Reply, DispatchError> {
        self.resolve(request)?.invoke(ctx)
    }
}

/// Decodes the path. An empty path is the API root.
pub(crate) fn normalize_path(path: &str) -> String {
    let decoded = url_decode(path);
    if decoded.is_empty() {
        "/".to_string()
    } else {
        decoded
    }
}

/// Merges captures, query, body and `data`, then injects the reserved keys.
fn build_bag<C>(
    request: &Request,
    method: Method,
    path: &str,
    route: &Route<C>,
    handler: &Handler<C>,
    captures: Vec<(String, String)>,
) -> ArgumentBag {
    let mut bag = ArgumentBag::new();

    for (name, value) in captures {
        bag.insert(name, ArgValue::Text(value));
    }
    bag.merge(&request.query);
    if method == Method::Post {
        bag.merge(&request.body_params);
    }

    let flags = handler.route_flags();
    if flags.contains(RouteFlags::ACCEPT_DATA) {
        bag.insert("data", parse_body(request));
    } else if flags.contains(RouteFlags::ACCEPT_RAW_DATA) {
        bag.insert("data", ArgValue::Raw(request.body.clone()));
    }

    // Reserved keys go in last so requests cannot supply them.
    bag.insert("_method", ArgValue::text(method.as_str()));
    bag.insert("_route", ArgValue::text(route.pattern()));
    bag.insert("_path", ArgValue::text(path));
    bag.insert(
        "_headers",
        ArgValue::Map(
            request
                .headers
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
                .collect(),
        ),
    );
    bag.insert("_files", ArgValue::Map(request.files.clone()));

    bag
}
