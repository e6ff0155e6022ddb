//! # dianxiaomi-router
//!
//! Route table and dispatcher for the Dianxiaomi order API.
//!
//! This crate provides:
//! - Regex route patterns with named captures, matched in registration order
//! - Method masks and handler flags (`ACCEPT_DATA`, `ACCEPT_RAW_DATA`, `HIDDEN_ENDPOINT`)
//! - Name-driven argument binding against a declared parameter schema
//! - JSON/JSONP response encoding and a uniform error document
//! - An [`ApiServer`] that authenticates, dispatches and renders requests
//!
//! ## Quick Start
//!
//! ```
//! use dianxiaomi_router::{Handler, MethodMask, Param, Reply, Request, RouterBuilder};
//! use serde_json::json;
//!
//! let router = RouterBuilder::<()>::new()
//!     .route(
//!         r"/orders/(?P<id>\d+)",
//!         Handler::new("get_order", MethodMask::READABLE, |_, args| {
//!             Ok(Reply::new(json!({ "id": args.text("id") })))
//!         })
//!         .param(Param::required("id"))
//!         .param(Param::nullable("fields")),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let reply = router.dispatch(&(), &Request::get("/orders/42")).unwrap();
//! assert_eq!(reply.body, json!({ "id": "42" }));
//! ```
//!
//! ## Argument precedence
//!
//! The argument bag is built from path captures, then query parameters,
//! then body parameters (POST only). Later sources overwrite earlier ones.
//! `data` is added for handlers that accept a body, and the reserved keys
//! `_method`, `_route`, `_path`, `_headers` and `_files` always come last.
//!
//! ## Match order
//!
//! The first route whose handler accepts the method and whose pattern
//! matches wins. A more specific pattern registered after a general one
//! that also matches is unreachable, so register specific routes first.

mod args;
mod codec;
mod dispatch;
mod error;
mod identity;
mod method;
mod path;
mod request;
mod response;
mod router;
mod server;

pub use args::{bind, url_decode, ArgValue, ArgumentBag, BoundArgs, Param};
pub use codec::{
    encode, error_body, is_valid_jsonp_callback, parse_body, JSONP_CONTENT_TYPE,
    JSON_CONTENT_TYPE,
};
pub use dispatch::{Resolved, RESERVED_KEYS};
pub use error::{ApiError, DispatchError, Result, RouterError};
pub use identity::{Authenticator, Capability, Identity};
pub use method::{Method, MethodMask, RouteFlags};
pub use path::RoutePattern;
pub use request::Request;
pub use response::{Reply, Response};
pub use router::{
    Callback, Handler, HandlerResult, Resource, Route, RouteDescription, RouteGroup, Router,
    RouterBuilder,
};
pub use server::{ApiServer, ServerConfig};
