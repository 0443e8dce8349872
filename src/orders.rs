// In-memory order table for one session.

use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::constants::FIRST_ORDER_NUMBER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_id: String,
    pub status: OrderStatus,
    pub total: f64,
}

/// Result of a cancel request. Every variant is a normal answer for the user,
/// not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled(String),
    AlreadyCancelled(String),
    AlreadyShipped(String),
    NotFound(String),
}

impl fmt::Display for CancelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelOutcome::Cancelled(id) => write!(f, "🛑 Order {} has been successfully cancelled.", id),
            CancelOutcome::AlreadyCancelled(id) => write!(f, "⚠️ Order {} is already cancelled.", id),
            CancelOutcome::AlreadyShipped(id) => {
                write!(f, "⚠️ Order {} has already been shipped and cannot be cancelled.", id)
            }
            CancelOutcome::NotFound(id) => write!(f, "⚠️ Order {} not found.", id),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct OrderStore {
    // Rows are never removed, so the row count doubles as the id sequence.
    orders: Vec<Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three orders every new session starts with.
    pub fn demo() -> Self {
        Self {
            orders: vec![
                Order { order_id: "ORD-1001".to_string(), status: OrderStatus::Processing, total: 49.99 },
                Order { order_id: "ORD-1002".to_string(), status: OrderStatus::Shipped, total: 19.95 },
                Order { order_id: "ORD-1003".to_string(), status: OrderStatus::Processing, total: 5.00 },
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn get(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.order_id == order_id)
    }

    /// Orders in the order they were placed.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Adds a processing order and returns its new identifier.
    ///
    /// `total` must be finite and non-negative; callers decoding untrusted
    /// input clamp it first (see `Command::from_tool_call`).
    pub fn place(&mut self, total: f64) -> String {
        debug_assert!(total.is_finite() && total >= 0.0, "invalid order total {total}");
        let order_id = format!("ORD-{}", self.orders.len() + FIRST_ORDER_NUMBER);
        self.orders.push(Order {
            order_id: order_id.clone(),
            status: OrderStatus::Processing,
            total,
        });
        info!(%order_id, total, "Order placed");
        order_id
    }

    pub fn cancel(&mut self, order_id: &str) -> CancelOutcome {
        let Some(order) = self.orders.iter_mut().find(|order| order.order_id == order_id) else {
            debug!(%order_id, "Cancel requested for unknown order");
            return CancelOutcome::NotFound(order_id.to_string());
        };

        match order.status {
            OrderStatus::Cancelled => CancelOutcome::AlreadyCancelled(order.order_id.clone()),
            OrderStatus::Shipped => CancelOutcome::AlreadyShipped(order.order_id.clone()),
            OrderStatus::Processing => {
                order.status = OrderStatus::Cancelled;
                info!(%order_id, "Order cancelled");
                CancelOutcome::Cancelled(order.order_id.clone())
            }
        }
    }
}
