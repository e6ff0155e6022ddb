//! End-to-end tests of the `/orders` routes through the API server.

mod common;
use common::*;

use dianxiaomi_router::{Request, Response};
use serde_json::json;

fn ids(res: &Response) -> Vec<u64> {
    res.json().unwrap()["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_u64().unwrap())
        .collect()
}

fn error_code(res: &Response) -> String {
    res.json().unwrap()["errors"][0]["code"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[test]
fn ping() {
    let res = server(seeded_store()).serve(&reader(Request::get("/orders/ping")));
    assert_eq!(res.status, 200);
    assert_eq!(res.json().unwrap(), json!("pong"));
}

#[test]
fn list_is_newest_first_with_totals() {
    let srv = server(seeded_store());

    let res = srv.serve(&reader(Request::get("/orders")));
    assert_eq!(res.status, 200);
    assert_eq!(ids(&res), (3..=12).rev().collect::<Vec<_>>());
    assert_eq!(res.headers["X-DXM-Total"], "12");
    assert_eq!(res.headers["X-DXM-TotalPages"], "2");

    let res = srv.serve(&reader(Request::get("/orders").query_param("page", "2")));
    assert_eq!(ids(&res), vec![2, 1]);
}

#[test]
fn list_filters_by_status_and_filter_map() {
    let srv = server(seeded_store());

    let res = srv.serve(&reader(Request::from_uri(
        "GET",
        "/orders?status=completed&filter[limit]=2&filter[order]=ASC",
    )));
    assert_eq!(ids(&res), vec![3, 6]);
    assert_eq!(res.headers["X-DXM-Total"], "4");
    assert_eq!(res.headers["X-DXM-TotalPages"], "2");

    let res = srv.serve(&reader(Request::from_uri(
        "GET",
        "/orders?filter[created_at_min]=2024-01-10&filter[limit]=-1",
    )));
    assert_eq!(ids(&res), vec![12, 11, 10]);
}

#[test]
fn list_with_field_selection() {
    let res = server(seeded_store()).serve(&reader(Request::from_uri(
        "GET",
        "/orders?fields=id,total&filter[limit]=1",
    )));
    assert_eq!(res.json().unwrap(), json!({"orders": [{"id": 12, "total": "12.00"}]}));
}

#[test]
fn list_rejects_unknown_status_and_bad_dates() {
    let srv = server(seeded_store());

    let res = srv.serve(&reader(Request::get("/orders").query_param("status", "shipped")));
    assert_eq!(res.status, 400);
    assert_eq!(error_code(&res), "dianxiaomi_api_invalid_order_status");

    let res = srv.serve(&reader(Request::from_uri(
        "GET",
        "/orders?filter[updated_at_max]=soon",
    )));
    assert_eq!(res.status, 400);
    assert_eq!(error_code(&res), "dianxiaomi_api_invalid_date");
}

#[test]
fn count_ignores_pagination() {
    let srv = server(seeded_store());

    let res = srv.serve(&reader(Request::from_uri(
        "GET",
        "/orders/count?status[]=completed&status[]=processing&filter[limit]=1",
    )));
    assert_eq!(res.json().unwrap(), json!({"count": 12}));

    let res = srv.serve(&reader(Request::get("/orders/count").query_param("status", "completed")));
    assert_eq!(res.json().unwrap(), json!({"count": 4}));
}

#[test]
fn get_single_order() {
    let srv = server(seeded_store());

    let res = srv.serve(&reader(Request::get("/orders/5").query_param("fields", "id,status")));
    assert_eq!(res.json().unwrap(), json!({"order": {"id": 5, "status": "processing"}}));

    let res = srv.serve(&reader(Request::get("/orders/5")));
    let order = &res.json().unwrap()["order"];
    assert_eq!(order["order_number"], "5");
    assert_eq!(order["created_at"], "2024-01-05T00:00:00Z");
    assert!(order.get("notes").is_none());
}

#[test]
fn unknown_order_is_404() {
    let srv = server(seeded_store());

    let res = srv.serve(&reader(Request::get("/orders/99")));
    assert_eq!(res.status, 404);
    assert_eq!(error_code(&res), "dianxiaomi_api_invalid_order_id");
    assert_eq!(res.json().unwrap()["errors"][0]["message"], "Invalid order ID");

    let res = srv.serve(&reader(Request::get("/orders/abc")));
    assert_eq!(res.status, 404);
    assert_eq!(error_code(&res), "dianxiaomi_api_no_route");
}

#[test]
fn non_ascii_digits_are_not_order_ids() {
    let srv = server(seeded_store());

    // Arabic-Indic "12".
    let res = srv.serve(&reader(Request::get("/orders/\u{0661}\u{0662}")));
    assert_eq!(res.status, 404);
    assert_eq!(error_code(&res), "dianxiaomi_api_no_route");

    let res = srv.serve(&reader(Request::get("/orders/\u{0661}\u{0662}/notes")));
    assert_eq!(res.status, 404);
    assert_eq!(error_code(&res), "dianxiaomi_api_no_route");
}

#[test]
fn capabilities_are_enforced() {
    let srv = server(seeded_store());

    let res = srv.serve(&Request::get("/orders"));
    assert_eq!(res.status, 401);
    assert_eq!(error_code(&res), "test_auth");

    let res = srv.serve(&Request::get("/orders").header("X-Test-Caps", "none"));
    assert_eq!(res.status, 401);
    assert_eq!(error_code(&res), "dianxiaomi_api_user_cannot_read_orders");

    let res = srv.serve(
        &reader(Request::put("/orders/1"))
            .json_body(&json!({"order": {"status": "completed"}})),
    );
    assert_eq!(res.status, 401);
    assert_eq!(error_code(&res), "dianxiaomi_api_user_cannot_edit_order");
}

#[test]
fn edit_order_changes_status_and_note() {
    let store = seeded_store();
    let srv = server(store);

    let res = srv.serve(&editor(Request::put("/orders/1")).json_body(&json!({
        "order": {"status": "on-hold", "customer_note": "leave at the door"}
    })));
    assert_eq!(res.status, 200);
    let order = &res.json().unwrap()["order"];
    assert_eq!(order["status"], "on-hold");
    assert_eq!(order["customer_note"], "leave at the door");

    let res = srv.serve(&reader(Request::get("/orders/1/notes")));
    let notes = res.json().unwrap()["order_notes"].clone();
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(
        notes[0]["note"],
        "Order status changed from Processing to On hold."
    );
    assert_eq!(notes[0]["customer_note"], false);
}

#[test]
fn edit_order_validates_body() {
    let srv = server(seeded_store());

    let res = srv.serve(&editor(Request::put("/orders/1")).json_body(&json!({"status": "completed"})));
    assert_eq!(res.status, 400);
    assert_eq!(error_code(&res), "dianxiaomi_api_missing_order_data");

    let res = srv.serve(&editor(Request::put("/orders/1")).body("not json"));
    assert_eq!(res.status, 400);
    assert_eq!(error_code(&res), "dianxiaomi_api_missing_order_data");

    let res = srv.serve(
        &editor(Request::new("PATCH", "/orders/1"))
            .json_body(&json!({"order": {"status": "lost"}})),
    );
    assert_eq!(res.status, 400);
    assert_eq!(error_code(&res), "dianxiaomi_api_invalid_order_status");

    let res = srv.serve(
        &editor(Request::put("/orders/404"))
            .json_body(&json!({"order": {"status": "completed"}})),
    );
    assert_eq!(res.status, 404);
}

#[test]
fn ship_order_records_tracking() {
    let srv = server(seeded_store());

    let res = srv.serve(&editor(Request::post("/orders/2/ship")).json_body(&json!({
        "tracking_provider": "ups",
        "tracking_provider_name": "UPS",
        "tracking_number": "1Z999AA10123456784",
        "ship_date": "2024-02-01"
    })));
    assert_eq!(res.status, 200);
    let order = &res.json().unwrap()["order"];
    assert_eq!(order["status"], "completed");
    assert!(order["completed_at"].is_string());
    assert_eq!(order["tracking"]["tracking_number"], "1Z999AA10123456784");
    assert_eq!(order["tracking"]["ship_date"], "2024-02-01");

    let res = srv.serve(&reader(Request::get("/orders/2/notes").query_param("fields", "note,customer_note")));
    assert_eq!(
        res.json().unwrap()["order_notes"],
        json!([
            {"note": "Order status changed from Processing to Completed.", "customer_note": false},
            {
                "note": "Your order was shipped via UPS. Tracking number is 1Z999AA10123456784.",
                "customer_note": true
            }
        ])
    );
}

#[test]
fn ship_order_accepts_form_bodies_and_put() {
    let srv = server(seeded_store());

    let res = srv.serve(
        &editor(Request::put("/orders/4/ship"))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("tracking_provider=dhl&tracking_number=JD014600"),
    );
    assert_eq!(res.status, 200);
    assert_eq!(res.json().unwrap()["order"]["tracking"]["tracking_provider"], "dhl");
}

#[test]
fn ship_order_requires_tracking_fields() {
    let srv = server(seeded_store());

    let res = srv.serve(
        &editor(Request::post("/orders/2/ship"))
            .json_body(&json!({"tracking_provider": "ups"})),
    );
    assert_eq!(res.status, 400);
    assert_eq!(error_code(&res), "dianxiaomi_api_missing_tracking_field");
    assert_eq!(res.json().unwrap()["errors"][0]["message"], "Missing tracking_number");

    // Shipping is not reachable with GET.
    let res = srv.serve(&editor(Request::get("/orders/2/ship")));
    assert_eq!(res.status, 404);
    assert_eq!(error_code(&res), "dianxiaomi_api_no_route");
}

#[test]
fn head_returns_headers_only() {
    let res = server(seeded_store()).serve(&reader(Request::new("HEAD", "/orders")));
    assert_eq!(res.status, 200);
    assert!(res.body.is_empty());
    assert_eq!(res.headers["X-DXM-Total"], "12");
}

#[test]
fn index_lists_order_routes() {
    let res = server(seeded_store()).serve(&Request::get("/"));
    let routes = res.json().unwrap()["store"]["routes"].clone();

    assert_eq!(
        routes[r"/orders/(?P<id>\d+)"]["supports"],
        json!(["HEAD", "GET", "POST", "PUT", "PATCH"])
    );
    assert_eq!(routes[r"/orders/(?P<id>\d+)"]["accepts_data"], true);
    assert_eq!(routes[r"/orders/(?P<id>\d+)/ship"]["supports"], json!(["POST", "PUT"]));
    assert_eq!(routes["/orders/ping"]["accepts_data"], false);
    assert_eq!(routes.as_object().map(|r| r.len()), Some(7));
}
