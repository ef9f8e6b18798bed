//! Domain events
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: String, customer_id: i64, total_price: Decimal, item_count: usize, placed_at: DateTime<Utc> },
}

impl OrderEvent {
    pub fn order_id(&self) -> &str {
        match self { Self::Placed { order_id, .. } => order_id }
    }
}
