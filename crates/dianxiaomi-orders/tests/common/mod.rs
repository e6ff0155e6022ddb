#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use dianxiaomi_orders::{MemoryOrderStore, Order, OrderStatus, OrdersResource};
use dianxiaomi_router::{
    ApiError, ApiServer, Authenticator, Capability, Identity, Request, RouterBuilder,
    ServerConfig,
};

/// Authenticates from `X-Test-Caps: read,edit`. No header means no user.
pub struct CapsHeaderAuth;

impl Authenticator for CapsHeaderAuth {
    fn authenticate(&self, request: &Request) -> Result<Identity, ApiError> {
        let caps = request
            .get_header("X-Test-Caps")
            .ok_or_else(|| ApiError::unauthorized("test_auth", "no user"))?;
        let capabilities = caps
            .split(',')
            .filter_map(|c| match c.trim() {
                "read" => Some(Capability::ReadOrders),
                "edit" => Some(Capability::EditOrders),
                _ => None,
            })
            .collect();
        Ok(Identity {
            user_id: 7,
            login: "shop-manager".to_string(),
            capabilities,
        })
    }
}

/// Twelve orders, one day apart from 2024-01-01. Every third is completed.
pub fn seeded_store() -> Arc<MemoryOrderStore> {
    let start = dianxiaomi_orders::parse_date("2024-01-01").unwrap();
    let orders = (1..=12).map(|id| {
        let mut order = Order::new(id, start + Duration::days(i64::try_from(id).unwrap() - 1));
        order.status = if id % 3 == 0 {
            OrderStatus::Completed
        } else {
            OrderStatus::Processing
        };
        order.total = format!("{id}.00");
        order
    });
    Arc::new(MemoryOrderStore::new(orders))
}

pub fn server(store: Arc<MemoryOrderStore>) -> ApiServer<CapsHeaderAuth> {
    let builder = RouterBuilder::new().resource(&OrdersResource::new(store));
    ApiServer::new(builder, CapsHeaderAuth, ServerConfig::default()).unwrap()
}

pub fn reader(request: Request) -> Request {
    request.header("X-Test-Caps", "read")
}

pub fn editor(request: Request) -> Request {
    request.header("X-Test-Caps", "read,edit")
}
