//! # dianxiaomi-orders
//!
//! The `/orders` resource of the Dianxiaomi order API: listing, counting,
//! reading and editing orders, recording shipments with tracking numbers,
//! and reading order notes.
//!
//! Routes are registered through [`OrdersResource`], which implements the
//! router's [`Resource`](dianxiaomi_router::Resource) trait over any
//! [`OrderStore`].
//!
//! ```
//! use std::sync::Arc;
//!
//! use dianxiaomi_orders::{MemoryOrderStore, OrdersResource};
//! use dianxiaomi_router::{Identity, RouterBuilder};
//!
//! let store = Arc::new(MemoryOrderStore::default());
//! let router = RouterBuilder::<Identity>::new()
//!     .resource(&OrdersResource::new(store))
//!     .build()
//!     .unwrap();
//! assert_eq!(router.routes().len(), 6);
//! ```

mod error;
mod order;
mod query;
mod resource;
mod store;

pub use error::{OrderError, Result};
pub use order::{select_fields, Address, LineItem, Order, OrderNote, OrderStatus, TrackingInfo};
pub use query::{parse_date, OrderDirection, OrderQuery, DEFAULT_LIMIT};
pub use resource::{OrdersResource, TOTAL_HEADER, TOTAL_PAGES_HEADER};
pub use store::{MemoryOrderStore, OrderPage, OrderStore};
