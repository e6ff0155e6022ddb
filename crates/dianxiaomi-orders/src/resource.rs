//! The `/orders` route group.

use std::sync::Arc;

use chrono::NaiveDate;
use dianxiaomi_router::{
    ArgValue, BoundArgs, Capability, Handler, HandlerResult, Identity, MethodMask, Param,
    Reply, Resource, RouteFlags, RouteGroup,
};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::{OrderError, Result};
use crate::order::{select_fields, OrderStatus, TrackingInfo};
use crate::query::OrderQuery;
use crate::store::OrderStore;

/// Total matches header on order listings.
pub const TOTAL_HEADER: &str = "X-DXM-Total";
/// Total pages header on order listings.
pub const TOTAL_PAGES_HEADER: &str = "X-DXM-TotalPages";

const CANNOT_READ: (&str, &str) = (
    "dianxiaomi_api_user_cannot_read_orders",
    "You do not have permission to read orders",
);
const CANNOT_EDIT: (&str, &str) = (
    "dianxiaomi_api_user_cannot_edit_order",
    "You do not have permission to edit this order",
);

/// Order routes backed by an [`OrderStore`].
pub struct OrdersResource<S> {
    store: Arc<S>,
}

impl<S: OrderStore + 'static> OrdersResource<S> {
    /// Creates the resource over a shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn handler<F>(&self, name: &str, methods: MethodMask, f: F) -> Handler<Identity>
    where
        F: Fn(&S, &Identity, &BoundArgs) -> HandlerResult + Send + Sync + 'static,
    {
        let store = Arc::clone(&self.store);
        Handler::new(name, methods, move |identity: &Identity, args: &BoundArgs| {
            f(store.as_ref(), identity, args)
        })
    }
}

impl<S: OrderStore + 'static> Resource<Identity> for OrdersResource<S> {
    fn routes(&self) -> RouteGroup<Identity> {
        let id = r"/(?P<id>\d+)";
        RouteGroup::new("/orders")
            .route(
                "/ping",
                Handler::new("ping", MethodMask::READABLE, |_: &Identity, _: &BoundArgs| {
                    Ok(Reply::new(json!("pong")))
                }),
            )
            .route(
                "",
                self.handler("get_orders", MethodMask::READABLE, get_orders::<S>)
                    .param(Param::nullable("fields"))
                    .param(Param::optional("filter", ArgValue::Map(Default::default())))
                    .param(Param::nullable("status"))
                    .param(Param::optional("page", ArgValue::text("1"))),
            )
            .route(
                "/count",
                self.handler("get_orders_count", MethodMask::READABLE, get_orders_count::<S>)
                    .param(Param::nullable("status"))
                    .param(Param::optional("filter", ArgValue::Map(Default::default()))),
            )
            .route(
                id,
                self.handler("get_order", MethodMask::READABLE, get_order::<S>)
                    .param(Param::required("id"))
                    .param(Param::nullable("fields")),
            )
            .route(
                id,
                self.handler("edit_order", MethodMask::EDITABLE, edit_order::<S>)
                    .flags(RouteFlags::ACCEPT_DATA)
                    .param(Param::required("id"))
                    .param(Param::required("data")),
            )
            .route(
                &format!("{id}/ship"),
                self.handler("ship_order", MethodMask::POST | MethodMask::PUT, ship_order::<S>)
                    .flags(RouteFlags::ACCEPT_DATA)
                    .param(Param::required("id"))
                    .param(Param::required("data")),
            )
            .route(
                &format!("{id}/notes"),
                self.handler("get_order_notes", MethodMask::READABLE, get_order_notes::<S>)
                    .param(Param::required("id"))
                    .param(Param::nullable("fields")),
            )
    }
}

fn get_orders<S: OrderStore>(store: &S, identity: &Identity, args: &BoundArgs) -> HandlerResult {
    identity.require(Capability::ReadOrders, CANNOT_READ.0, CANNOT_READ.1)?;

    let query = listing_query(args)?.with_page(page(args)?);
    let page = store.list(&query)?;
    let fields = args.text("fields");
    let orders = page
        .orders
        .iter()
        .map(|order| Ok(select_fields(order.to_json()?, fields)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Reply::new(json!({ "orders": orders }))
        .header(TOTAL_HEADER, page.total.to_string())
        .header(TOTAL_PAGES_HEADER, page.total_pages.to_string()))
}

fn get_orders_count<S: OrderStore>(
    store: &S,
    identity: &Identity,
    args: &BoundArgs,
) -> HandlerResult {
    identity.require(Capability::ReadOrders, CANNOT_READ.0, CANNOT_READ.1)?;

    let count = store.count(&listing_query(args)?)?;
    Ok(Reply::new(json!({ "count": count })))
}

fn get_order<S: OrderStore>(store: &S, identity: &Identity, args: &BoundArgs) -> HandlerResult {
    identity.require(Capability::ReadOrders, CANNOT_READ.0, CANNOT_READ.1)?;

    let order = store.find(order_id(args)?)?;
    let body = select_fields(order.to_json()?, args.text("fields"));
    Ok(Reply::new(json!({ "order": body })))
}

fn edit_order<S: OrderStore>(store: &S, identity: &Identity, args: &BoundArgs) -> HandlerResult {
    identity.require(Capability::EditOrders, CANNOT_EDIT.0, CANNOT_EDIT.1)?;

    let id = order_id(args)?;
    let data = body_object(args)?;
    let fields = match data.get("order") {
        Some(Value::Object(fields)) => fields.clone(),
        _ => return Err(OrderError::MissingData.into()),
    };

    let status = string_field(&fields, "status")
        .map(OrderStatus::parse)
        .transpose()?;
    let note = fields
        .get("customer_note")
        .and_then(Value::as_str)
        .map(str::to_string);

    let order = store.update(id, &mut |order| {
        if let Some(status) = status {
            order.set_status(status);
        }
        if let Some(note) = &note {
            order.customer_note.clone_from(note);
        }
        Ok(())
    })?;

    info!(id, user = %identity.login, status = %order.status, "edited order");
    Ok(Reply::new(json!({ "order": order.to_json()? })))
}

fn ship_order<S: OrderStore>(store: &S, identity: &Identity, args: &BoundArgs) -> HandlerResult {
    identity.require(Capability::EditOrders, CANNOT_EDIT.0, CANNOT_EDIT.1)?;

    let id = order_id(args)?;
    let tracking = tracking_info(&body_object(args)?)?;
    let order = store.update(id, &mut |order| {
        order.ship(tracking.clone());
        Ok(())
    })?;

    info!(
        id,
        user = %identity.login,
        provider = %tracking.tracking_provider,
        number = %tracking.tracking_number,
        "shipped order"
    );
    Ok(Reply::new(json!({ "order": order.to_json()? })))
}

fn get_order_notes<S: OrderStore>(
    store: &S,
    identity: &Identity,
    args: &BoundArgs,
) -> HandlerResult {
    identity.require(Capability::ReadOrders, CANNOT_READ.0, CANNOT_READ.1)?;

    let order = store.find(order_id(args)?)?;
    let fields = args.text("fields");
    let notes = order
        .notes
        .iter()
        .map(|note| Ok(select_fields(serde_json::to_value(note)?, fields)))
        .collect::<std::result::Result<Vec<_>, serde_json::Error>>()
        .map_err(OrderError::from)?;
    Ok(Reply::new(json!({ "order_notes": notes })))
}

fn order_id(args: &BoundArgs) -> Result<u64> {
    let raw = args.text("id").unwrap_or_default();
    raw.parse().map_err(|_| OrderError::InvalidId(raw.to_string()))
}

fn listing_query(args: &BoundArgs) -> Result<OrderQuery> {
    let statuses: Vec<&str> = match args.get("status") {
        Some(ArgValue::Text(status)) => vec![status.as_str()],
        Some(ArgValue::List(statuses)) => statuses.iter().map(String::as_str).collect(),
        _ => Vec::new(),
    };
    let query = OrderQuery::new().with_statuses(statuses)?;
    match args.map("filter") {
        Some(filter) => query.with_filter(filter),
        None => Ok(query),
    }
}

fn page(args: &BoundArgs) -> Result<usize> {
    let raw = args.text("page").unwrap_or("1");
    raw.trim().parse().map_err(|_| OrderError::InvalidFilter {
        key: "page".to_string(),
        value: raw.to_string(),
    })
}

/// Returns the request body as a JSON object. Form bodies arrive as maps.
fn body_object(args: &BoundArgs) -> Result<Map<String, Value>> {
    match args.get("data").map(ArgValue::to_json) {
        Some(Value::Object(data)) => Ok(data),
        _ => Err(OrderError::MissingData),
    }
}

fn string_field<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn tracking_info(data: &Map<String, Value>) -> Result<TrackingInfo> {
    let provider = string_field(data, "tracking_provider")
        .ok_or(OrderError::MissingField("tracking_provider"))?;
    let number = string_field(data, "tracking_number")
        .ok_or(OrderError::MissingField("tracking_number"))?;

    let mut tracking = TrackingInfo::new(provider, number);
    tracking.tracking_provider_name =
        string_field(data, "tracking_provider_name").map(str::to_string);
    tracking.ship_date = string_field(data, "ship_date")
        .map(|date| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| OrderError::InvalidDate(date.to_string()))
        })
        .transpose()?;
    Ok(tracking)
}
