//! Order Ledger
//!
//! Persistence contract for created orders, plus an in-memory
//! implementation for development and tests. Orders are owned by the
//! ledger after creation and mutated only through it.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::error::{Result, StoreError};
use crate::model::{Order, OrderStatus};

/// Generate an opaque order key (e.g., "wc_order_4f9a2c1d0e8b7")
fn generate_order_key() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("wc_order_{}", &hex[0..13])
}

/// Order persistence contract
pub trait OrderLedger: Send + Sync {
    /// Persist a new order, assigning its id and order key
    fn create(&self, order: Order) -> Result<Order>;

    /// Fetch an order by id
    fn get(&self, id: u64) -> Result<Option<Order>>;

    /// Update an order's lifecycle status
    fn update_status(&self, id: u64, status: OrderStatus) -> Result<()>;
}

/// In-memory order ledger (for development and tests)
pub struct MemoryOrderLedger {
    orders: RwLock<HashMap<u64, Order>>,
    next_id: AtomicU64,
}

impl Default for MemoryOrderLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOrderLedger {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl OrderLedger for MemoryOrderLedger {
    fn create(&self, mut order: Order) -> Result<Order> {
        order.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        order.order_key = generate_order_key();
        order.created_at = Utc::now();
        order.updated_at = order.created_at;

        let mut orders = self.orders.write().unwrap();
        orders.insert(order.id, order.clone());

        tracing::info!(order_id = order.id, status = %order.status.as_str(), "Persisted order");
        Ok(order)
    }

    fn get(&self, id: u64) -> Result<Option<Order>> {
        let orders = self.orders.read().unwrap();
        Ok(orders.get(&id).cloned())
    }

    fn update_status(&self, id: u64, status: OrderStatus) -> Result<()> {
        let mut orders = self.orders.write().unwrap();

        let order = orders
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("order {id}")))?;

        order.status = status;
        order.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_id_and_key() {
        let ledger = MemoryOrderLedger::new();
        let saved = ledger
            .create(Order::new(OrderStatus::Pending, "USD"))
            .unwrap();

        assert_eq!(saved.id, 1);
        assert!(saved.order_key.starts_with("wc_order_"));
        assert_eq!(saved.order_key.len(), "wc_order_".len() + 13);
    }

    #[test]
    fn test_ids_are_sequential() {
        let ledger = MemoryOrderLedger::new();
        let first = ledger
            .create(Order::new(OrderStatus::Pending, "USD"))
            .unwrap();
        let second = ledger
            .create(Order::new(OrderStatus::Pending, "USD"))
            .unwrap();

        assert_eq!(second.id, first.id + 1);
        assert_ne!(first.order_key, second.order_key);
    }

    #[test]
    fn test_update_status() {
        let ledger = MemoryOrderLedger::new();
        let saved = ledger
            .create(Order::new(OrderStatus::Pending, "USD"))
            .unwrap();

        ledger
            .update_status(saved.id, OrderStatus::Processing)
            .unwrap();

        let fetched = ledger.get(saved.id).unwrap().unwrap();
        assert_eq!(fetched.status, OrderStatus::Processing);
    }

    #[test]
    fn test_update_missing_order_fails() {
        let ledger = MemoryOrderLedger::new();
        let err = ledger.update_status(42, OrderStatus::Completed).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
