//! Order storage.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::debug;

use crate::error::{OrderError, Result};
use crate::order::Order;
use crate::query::{OrderDirection, OrderQuery};

/// One page of an order listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPage {
    /// Orders on this page.
    pub orders: Vec<Order>,
    /// Matches across all pages.
    pub total: usize,
    /// Number of pages.
    pub total_pages: usize,
}

/// Storage backend for orders.
pub trait OrderStore: Send + Sync {
    /// Returns the order with `id`.
    fn find(&self, id: u64) -> Result<Order>;

    /// Returns the requested page of matching orders.
    fn list(&self, query: &OrderQuery) -> Result<OrderPage>;

    /// Counts matching orders, ignoring pagination.
    fn count(&self, query: &OrderQuery) -> Result<usize>;

    /// Applies `change` to the order with `id` and returns the saved order.
    ///
    /// Nothing is saved if `change` fails. `updated_at` is stamped on
    /// success.
    fn update(&self, id: u64, change: &mut dyn FnMut(&mut Order) -> Result<()>)
        -> Result<Order>;

    /// Inserts or replaces an order.
    fn insert(&self, order: Order) -> Result<()>;
}

/// An in-memory order store.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<BTreeMap<u64, Order>>,
}

impl MemoryOrderStore {
    /// Creates a store seeded with `orders`.
    pub fn new(orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            orders: RwLock::new(orders.into_iter().map(|o| (o.id, o)).collect()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<u64, Order>>> {
        self.orders
            .read()
            .map_err(|_| OrderError::Storage("order lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<u64, Order>>> {
        self.orders
            .write()
            .map_err(|_| OrderError::Storage("order lock poisoned".to_string()))
    }
}

impl OrderStore for MemoryOrderStore {
    fn find(&self, id: u64) -> Result<Order> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or(OrderError::NotFound(id))
    }

    fn list(&self, query: &OrderQuery) -> Result<OrderPage> {
        let orders = self.read()?;
        let mut matching: Vec<&Order> = orders.values().filter(|o| query.matches(o)).collect();
        if query.direction == OrderDirection::Desc {
            matching.reverse();
        }

        let total = matching.len();
        let page = matching
            .into_iter()
            .skip(query.skip())
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect::<Vec<_>>();

        debug!(total, returned = page.len(), "listed orders");
        Ok(OrderPage {
            orders: page,
            total,
            total_pages: query.total_pages(total),
        })
    }

    fn count(&self, query: &OrderQuery) -> Result<usize> {
        Ok(self.read()?.values().filter(|o| query.matches(o)).count())
    }

    fn update(
        &self,
        id: u64,
        change: &mut dyn FnMut(&mut Order) -> Result<()>,
    ) -> Result<Order> {
        let mut orders = self.write()?;
        let stored = orders.get_mut(&id).ok_or(OrderError::NotFound(id))?;

        let mut draft = stored.clone();
        change(&mut draft)?;
        draft.updated_at = Utc::now();
        *stored = draft.clone();

        debug!(id, status = %draft.status, "updated order");
        Ok(draft)
    }

    fn insert(&self, order: Order) -> Result<()> {
        self.write()?.insert(order.id, order);
        Ok(())
    }
}
