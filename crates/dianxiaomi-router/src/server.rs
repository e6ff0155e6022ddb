//! The API boundary: authenticate, dispatch, normalize, encode.

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::codec::{encode, error_body, is_valid_jsonp_callback};
use crate::dispatch::normalize_path;
use crate::error::{ApiError, Result};
use crate::identity::{Authenticator, Identity};
use crate::method::{Method, MethodMask};
use crate::request::Request;
use crate::response::{Reply, Response};
use crate::router::{Handler, Router, RouterBuilder};

/// Server settings, read from the `server` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Store name shown by the index route.
    pub name: String,
    /// Store description shown by the index route.
    pub description: String,
    /// Public store URL.
    pub url: String,
    /// API version string.
    pub version: String,
    /// Whether `?_jsonp=callback` is honored.
    pub jsonp_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Dianxiaomi".to_string(),
            description: String::new(),
            url: "http://localhost".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            jsonp_enabled: true,
        }
    }
}

/// Serves API requests end to end.
///
/// The router's handler context is the authenticated [`Identity`].
pub struct ApiServer<A> {
    router: Router<Identity>,
    authenticator: A,
    config: ServerConfig,
}

impl<A: Authenticator> ApiServer<A> {
    /// Adds the index route to `builder`, builds the table and wraps it.
    ///
    /// The index is registered ahead of every other route, so a broad
    /// resource pattern cannot shadow `/`.
    pub fn new(
        builder: RouterBuilder<Identity>,
        authenticator: A,
        config: ServerConfig,
    ) -> Result<Self> {
        let index: Arc<OnceLock<Value>> = Arc::new(OnceLock::new());
        let slot = Arc::clone(&index);
        let router = builder
            .route_first(
                "/",
                Handler::new("get_index", MethodMask::READABLE, move |_, _| {
                    Ok(Reply::new(slot.get().cloned().unwrap_or(Value::Null)))
                }),
            )
            .build()?;

        // The slot is fresh, so this cannot already be set.
        let _ = index.set(index_document(&config, &router));

        Ok(Self {
            router,
            authenticator,
            config,
        })
    }

    /// Returns the route table.
    pub fn router(&self) -> &Router<Identity> {
        &self.router
    }

    /// Serves one request and returns the encoded response.
    pub fn serve(&self, request: &Request) -> Response {
        let jsonp = match self.jsonp_callback(request) {
            Ok(callback) => callback,
            Err(err) => return render(request, Err(err), None),
        };

        let request = apply_method_override(request);
        let result = self
            .authenticate(&request)
            .and_then(|identity| {
                self.router
                    .dispatch(&identity, &request)
                    .map_err(ApiError::from)
            });

        render(&request, result, jsonp)
    }

    /// The index route is public. Everything else needs credentials.
    fn authenticate(&self, request: &Request) -> std::result::Result<Identity, ApiError> {
        if normalize_path(&request.path) == "/" {
            return Ok(Identity::anonymous());
        }
        self.authenticator.authenticate(request).inspect_err(|err| {
            warn!(path = %request.path, code = %err.code, "authentication failed");
        })
    }

    fn jsonp_callback<'r>(
        &self,
        request: &'r Request,
    ) -> std::result::Result<Option<&'r str>, ApiError> {
        let Some(callback) = request.get_query("_jsonp") else {
            return Ok(None);
        };
        if !self.config.jsonp_enabled {
            return Err(ApiError::bad_request(
                "dianxiaomi_api_jsonp_disabled",
                "JSONP support is disabled on this site",
            ));
        }
        if !is_valid_jsonp_callback(callback) {
            return Err(ApiError::bad_request(
                "dianxiaomi_api_jsonp_callback_invalid",
                "The JSONP callback function is invalid",
            ));
        }
        Ok(Some(callback))
    }
}

/// Applies `?_method=` or `X-HTTP-Method-Override` to the request verb.
fn apply_method_override(request: &Request) -> Cow<'_, Request> {
    let method = request
        .get_query("_method")
        .or_else(|| request.get_header("X-HTTP-Method-Override"));

    match method {
        Some(method) => {
            let mut overridden = request.clone();
            overridden.method = method.to_ascii_uppercase();
            Cow::Owned(overridden)
        }
        None => Cow::Borrowed(request),
    }
}

/// Normalizes a result into a response and encodes it.
fn render(
    request: &Request,
    result: std::result::Result<Reply, ApiError>,
    jsonp: Option<&str>,
) -> Response {
    let reply = match result {
        Ok(reply) => reply,
        Err(err) => Reply::new(error_body(&err)).status(err.status),
    };

    info!(
        method = %request.method,
        path = %request.path,
        status = reply.status,
        "served request"
    );

    let (content_type, body) = encode(&reply.body, jsonp);
    let mut response = Response::new(reply.status).header("Content-Type", content_type);
    for (key, value) in reply.headers {
        response = response.header(key, value);
    }

    if Method::parse(&request.method) == Some(Method::Head) {
        return response;
    }
    response.body(body)
}

/// Builds the body of the index route.
fn index_document(config: &ServerConfig, router: &Router<Identity>) -> Value {
    let routes: Map<String, Value> = router
        .describe()
        .into_iter()
        .map(|route| {
            (
                route.pattern,
                json!({ "supports": route.supports, "accepts_data": route.accepts_data }),
            )
        })
        .collect();

    json!({
        "store": {
            "name": config.name,
            "description": config.description,
            "URL": config.url,
            "version": config.version,
            "routes": routes,
            "meta": { "jsonp_enabled": config.jsonp_enabled },
        }
    })
}
