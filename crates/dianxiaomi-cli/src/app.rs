//! Server assembly and request/response plumbing for the command line.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{bail, Context};
use dianxiaomi_auth::{KeyAuthenticator, NonceRegistry, UserDirectory};
use dianxiaomi_orders::{MemoryOrderStore, OrderStore, OrdersResource};
use dianxiaomi_router::{ApiServer, Request, Response, RouterBuilder};
use tracing::info;

use crate::config::AppConfig;

/// A fully wired server plus handles to its shared state.
pub struct App {
    pub server: ApiServer<KeyAuthenticator>,
    pub store: Arc<MemoryOrderStore>,
    pub nonces: Arc<NonceRegistry>,
}

impl App {
    /// Builds the route table, the authenticator and the order store.
    pub fn build(config: AppConfig) -> anyhow::Result<Self> {
        let store = Arc::new(MemoryOrderStore::default());
        for order in config.orders {
            let id = order.id;
            store
                .insert(order)
                .with_context(|| format!("failed to load order {id}"))?;
        }
        let nonces = Arc::new(NonceRegistry::new());
        let authenticator =
            KeyAuthenticator::new(UserDirectory::new(config.users), Arc::clone(&nonces));

        let builder = RouterBuilder::new().resource(&OrdersResource::new(Arc::clone(&store)));
        let server = ApiServer::new(builder, authenticator, config.server)
            .context("failed to build the route table")?;

        info!(
            routes = server.router().routes().len(),
            orders = store.count(&Default::default())?,
            "server ready"
        );
        Ok(Self {
            server,
            store,
            nonces,
        })
    }
}

/// Splits `key=value` (or `Key:Value` for headers) at the first separator.
pub fn parse_pair(raw: &str, separator: char) -> anyhow::Result<(String, String)> {
    match raw.split_once(separator) {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("expected KEY{separator}VALUE, got {raw:?}"),
    }
}

/// Request pieces collected from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct RequestArgs {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestArgs {
    /// Builds the request the server will see.
    ///
    /// Query and form pairs go through the same bracket parsing a host
    /// framework applies, so `status[]=a` and `filter[limit]=5` work.
    pub fn into_request(self) -> Request {
        let mut request = Request::new(self.method.to_ascii_uppercase(), self.path);
        request.query = Request::parse_query_string(&encode_pairs(&self.query));

        for (key, value) in self.headers {
            request = request.header(key, value);
        }

        if !self.form.is_empty() {
            let form = encode_pairs(&self.form);
            request.body_params = Request::parse_query_string(&form);
            request = request
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(form);
        } else if let Some(body) = self.body {
            if request.content_type().is_none() {
                request = request.header("Content-Type", "application/json");
            }
            request = request.body(body);
        }

        request
    }
}

fn encode_pairs(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Renders a response the way an HTTP client prints one.
pub fn format_response(response: &Response) -> String {
    let mut out = format!("HTTP/1.1 {} {}\n", response.status, response.status_text());
    for (key, value) in &response.headers {
        let _ = writeln!(out, "{key}: {value}");
    }
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(&response.body));
    out
}
