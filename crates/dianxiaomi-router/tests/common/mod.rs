#![allow(dead_code)]

use dianxiaomi_router::{
    BoundArgs, DispatchError, Handler, MethodMask, Reply, Request, Router,
};
use serde_json::{json, Value};

/// A handler that replies with its own name and every bound argument.
pub fn echo(name: &'static str, methods: MethodMask) -> Handler<()> {
    Handler::new(name, methods, move |_, args: &BoundArgs| {
        let bound: serde_json::Map<String, Value> = args
            .names()
            .map(|n| (n.to_string(), args.get(n).map(|v| v.to_json()).unwrap_or(Value::Null)))
            .collect();
        Ok(Reply::new(json!({ "handler": name, "args": bound })))
    })
}

pub fn dispatch(router: &Router<()>, request: &Request) -> Value {
    router
        .dispatch(&(), request)
        .unwrap_or_else(|e| panic!("dispatch failed for {}: {e:?}", request.path))
        .body
}

pub fn dispatch_err(router: &Router<()>, request: &Request) -> DispatchError {
    router
        .dispatch(&(), request)
        .expect_err(&format!("expected dispatch error for {}", request.path))
}

pub fn handler_name(router: &Router<()>, request: &Request) -> String {
    dispatch(router, request)["handler"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}
