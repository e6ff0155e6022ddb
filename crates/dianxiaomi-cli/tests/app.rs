//! Tests of the assembled server, loaded from a config file.

use std::fs;

use dianxiaomi_auth::{ApiUser, KEY_HEADER, NONCE_HEADER, REST_ACTION};
use dianxiaomi_cli::{format_response, App, AppConfig, RequestArgs};
use dianxiaomi_orders::{OrderStatus, OrderStore};
use dianxiaomi_router::{Capability, Request};
use serde_json::json;

const KEY: &str = "ck0123456789abcdefghij";

fn config_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let user = ApiUser::create(
        1,
        "shop",
        KEY,
        vec![Capability::ReadOrders, Capability::EditOrders],
    )
    .unwrap();
    let config = json!({
        "server": { "name": "Config Shop" },
        "users": [user],
        "orders": [{
            "id": 42,
            "created_at": "2024-04-01T08:00:00Z",
            "updated_at": "2024-04-01T08:00:00Z",
            "status": "processing",
            "total": "19.90"
        }]
    });

    let path = dir.path().join("dianxiaomi.json");
    fs::write(&path, config.to_string()).unwrap();
    path
}

fn app() -> App {
    let dir = tempfile::tempdir().unwrap();
    App::build(AppConfig::load(&config_file(&dir)).unwrap()).unwrap()
}

#[test]
fn index_reflects_config() {
    let res = app().server.serve(&Request::get("/"));
    assert_eq!(res.status, 200);
    assert_eq!(res.json().unwrap()["store"]["name"], "Config Shop");
}

#[test]
fn key_is_required() {
    let app = app();

    let res = app.server.serve(&Request::get("/orders/42"));
    assert_eq!(res.status, 401);
    assert_eq!(
        res.json().unwrap()["errors"][0]["message"],
        "Dianxiaomi API Key is missing"
    );

    let res = app
        .server
        .serve(&Request::get("/orders/42").header(KEY_HEADER, "wrongwrongwrongwrong00"));
    assert_eq!(res.status, 401);
    assert_eq!(
        res.json().unwrap()["errors"][0]["message"],
        "Dianxiaomi API Key is invalid"
    );
}

#[test]
fn key_in_header_or_query() {
    let app = app();

    let res = app
        .server
        .serve(&Request::get("/orders/42").header(KEY_HEADER, KEY));
    assert_eq!(res.status, 200);
    assert_eq!(res.json().unwrap()["order"]["total"], "19.90");

    let res = app
        .server
        .serve(&Request::from_uri("GET", &format!("/orders/count?key={KEY}")));
    assert_eq!(res.json().unwrap(), json!({"count": 1}));
}

#[test]
fn nonces_are_checked() {
    let app = app();
    let nonce = app.nonces.issue(1, REST_ACTION);

    let res = app.server.serve(
        &Request::get("/orders/42")
            .header(KEY_HEADER, KEY)
            .header(NONCE_HEADER, nonce),
    );
    assert_eq!(res.status, 200);

    let res = app.server.serve(
        &Request::get("/orders/42")
            .header(KEY_HEADER, KEY)
            .header(NONCE_HEADER, "0".repeat(64)),
    );
    assert_eq!(res.status, 403);
    assert_eq!(
        res.json().unwrap()["errors"][0]["code"],
        "dianxiaomi_api_invalid_nonce"
    );
}

#[test]
fn ship_from_command_line_arguments() {
    let app = app();
    let request = RequestArgs {
        method: "post".to_string(),
        path: "/orders/42/ship".to_string(),
        form: vec![
            ("tracking_provider".to_string(), "fedex".to_string()),
            ("tracking_number".to_string(), "7489".to_string()),
        ],
        headers: vec![(KEY_HEADER.to_string(), KEY.to_string())],
        ..RequestArgs::default()
    }
    .into_request();

    let res = app.server.serve(&request);
    assert_eq!(res.status, 200);
    assert!(format_response(&res).starts_with("HTTP/1.1 200 OK\n"));

    let saved = app.store.find(42).unwrap();
    assert_eq!(saved.status, OrderStatus::Completed);
    assert_eq!(
        saved.notes.last().map(|n| n.note.as_str()),
        Some("Your order was shipped via fedex. Tracking number is 7489.")
    );
}

#[test]
fn routes_are_listed_in_registration_order() {
    let app = app();
    let patterns: Vec<String> = app
        .server
        .router()
        .describe()
        .into_iter()
        .map(|r| r.pattern)
        .collect();
    assert_eq!(
        patterns,
        vec![
            "/",
            "/orders/ping",
            "/orders",
            "/orders/count",
            r"/orders/(?P<id>\d+)",
            r"/orders/(?P<id>\d+)/ship",
            r"/orders/(?P<id>\d+)/notes",
        ]
    );
}
