use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{
    AddressId, Children, CustomerId, Entity, EntityKind, OrderId, OrderItemId, PaymentId,
    ProductId,
};
use crate::errors::StorefrontError;

/// Fulfilment state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Stored (lowercase) representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StorefrontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(StorefrontError::InvalidValue {
                field: "order_status",
                reason: format!("unknown order status '{}'", other),
            }),
        }
    }
}

/// Customer order; owns its items, references customer, address and payment by id
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub payment_id: PaymentId,
    pub shipping_id: AddressId,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    pub items: Children<OrderItem>,
}

impl Order {
    /// Sum of `unit_price * quantity` over the currently held items
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(|item| item.read().line_total()).sum()
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }
}

impl Entity for Order {
    type Id = OrderId;
    const KIND: EntityKind = EntityKind::Order;

    fn id(&self) -> OrderId {
        self.id
    }
}

/// One product line on an order, priced at the time it was added
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub unit_price: f64,
    pub quantity: i64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;
    const KIND: EntityKind = EntityKind::OrderItem;

    fn id(&self) -> OrderItemId {
        self.id
    }
}

/// Input for `orders().create`
///
/// `status` and `order_date` fall back to the schema defaults
/// (`pending`, today's date) when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub payment_id: PaymentId,
    pub shipping_id: AddressId,
    pub status: Option<OrderStatus>,
    pub order_date: Option<NaiveDate>,
}

impl NewOrder {
    pub fn new(customer_id: CustomerId, payment_id: PaymentId, shipping_id: AddressId) -> Self {
        Self {
            customer_id,
            payment_id,
            shipping_id,
            status: None,
            order_date: None,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.order_date = Some(date);
        self
    }
}
