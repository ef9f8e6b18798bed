//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::domain::aggregates::Product;
use crate::domain::events::OrderEvent;
use crate::domain::value_objects::{IdempotencyKey, PhoneNumber};

pub const ORDER_ID_PREFIX: &str = "ORD-";

#[derive(Clone, Debug)]
pub struct Order {
    id: String,
    idempotency_key: IdempotencyKey,
    customer_id: i64,
    customer_name: String,
    customer_email: String,
    items: Vec<OrderItem>,
    total_price: Decimal,
    shipping: ShippingDetails,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    events: Vec<OrderEvent>,
}

/// Snapshot of a product at order time. Later product edits never reach it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub bean_name: String,
    pub form_name: String,
    pub roasted_grade: String,
    pub price: Decimal,
    pub image: String,
    pub order_quantity: i32,
}

impl OrderItem {
    pub fn snapshot(product: &Product, order_quantity: i32) -> Self {
        Self {
            product_id: product.id, bean_name: product.bean_name.clone(), form_name: product.form_name.clone(),
            roasted_grade: product.roasted_grade.clone(), price: product.price, image: product.image.clone(), order_quantity,
        }
    }
    pub fn line_total(&self) -> Decimal { self.price * Decimal::from(self.order_quantity) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerContact { pub name: String, pub email: String }

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShippingDetails { pub phone_number: PhoneNumber, pub alternative_phone_number: Option<PhoneNumber>, pub street: String, pub city: String }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Processing, Shipped, Delivered, Cancelled }

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [Self::Pending, Self::Processing, Self::Shipped, Self::Delivered, Self::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending", Self::Processing => "processing", Self::Shipped => "shipped",
            Self::Delivered => "delivered", Self::Cancelled => "cancelled",
        }
    }

    pub fn code(&self) -> i16 {
        match self { Self::Pending => 0, Self::Processing => 1, Self::Shipped => 2, Self::Delivered => 3, Self::Cancelled => 4 }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|status| status.as_str() == s).ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
    }
}

impl TryFrom<i16> for OrderStatus {
    type Error = OrderError;
    fn try_from(code: i16) -> Result<Self, Self::Error> {
        Self::ALL.into_iter().find(|status| status.code() == code).ok_or_else(|| OrderError::UnknownStatus(code.to_string()))
    }
}

impl Order {
    /// Assembles a pending order; the total is always derived from the item snapshots.
    pub fn place(
        id: String,
        idempotency_key: IdempotencyKey,
        customer_id: i64,
        contact: CustomerContact,
        shipping: ShippingDetails,
        items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        if items.is_empty() { return Err(OrderError::NoItems); }
        let total_price = items.iter().map(OrderItem::line_total).sum();
        let created_at = Utc::now();
        let mut order = Self {
            id, idempotency_key, customer_id, customer_name: contact.name, customer_email: contact.email,
            items, total_price, shipping, status: OrderStatus::Pending, created_at, events: vec![],
        };
        order.raise_event(OrderEvent::Placed {
            order_id: order.id.clone(), customer_id, total_price, item_count: order.items.len(), placed_at: created_at,
        });
        Ok(order)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn idempotency_key(&self) -> &IdempotencyKey { &self.idempotency_key }
    pub fn customer_id(&self) -> i64 { self.customer_id }
    pub fn customer_name(&self) -> &str { &self.customer_name }
    pub fn customer_email(&self) -> &str { &self.customer_email }
    pub fn items(&self) -> &[OrderItem] { &self.items }
    pub fn total_price(&self) -> Decimal { self.total_price }
    pub fn shipping(&self) -> &ShippingDetails { &self.shipping }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub fn take_events(&mut self) -> Vec<OrderEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: OrderEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Order has no items")]
    NoItems,
    #[error("Unknown order status {0:?}")]
    UnknownStatus(String),
}
