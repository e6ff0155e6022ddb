//! # dianxiaomi-cli
//!
//! Library side of the `dianxiaomi` binary: loading the JSON config file
//! and wiring the router, the key authenticator and the order store into
//! an [`ApiServer`](dianxiaomi_router::ApiServer).

mod app;
mod config;

pub use app::{format_response, parse_pair, App, RequestArgs};
pub use config::AppConfig;
