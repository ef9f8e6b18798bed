//! Cart aggregation: resolving requested cart item ids into open cart items.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use crate::domain::aggregates::{CartItem, CartItemStatus};
use crate::store::CartStore;

/// What to do with requested cart ids that cannot be resolved to an open cart item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationPolicy {
    /// Skip them and carry on with the rest.
    #[default]
    Tolerant,
    /// Fail the checkout on the first one.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cart aggregation policy {0:?}")]
pub struct UnknownPolicy(pub String);

impl FromStr for AggregationPolicy {
    type Err = UnknownPolicy;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tolerant" => Ok(Self::Tolerant),
            "strict" => Ok(Self::Strict),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    NotOpen(CartItemStatus),
    LookupFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::NotOpen(status) => write!(f, "already {status}"),
            Self::LookupFailed(e) => write!(f, "lookup failed: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCartItem {
    pub cart_item_id: i64,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartAggregation {
    pub resolved: Vec<CartItem>,
    pub skipped: Vec<SkippedCartItem>,
}

impl CartAggregation {
    pub fn is_complete(&self) -> bool { self.skipped.is_empty() }
    pub fn skipped_ids(&self) -> Vec<i64> { self.skipped.iter().map(|s| s.cart_item_id).collect() }
}

/// Fetches every id in order. Lookup failures, missing items and items that are no
/// longer open are recorded as skipped instead of failing the whole aggregation.
pub async fn aggregate<Tx: Send>(carts: &dyn CartStore<Tx>, cart_item_ids: &[i64]) -> CartAggregation {
    let mut aggregation = CartAggregation::default();
    for &cart_item_id in cart_item_ids {
        let reason = match carts.get_cart_item(cart_item_id).await {
            Ok(Some(item)) if item.is_open() => { aggregation.resolved.push(item); continue; }
            Ok(Some(item)) => SkipReason::NotOpen(item.status),
            Ok(None) => SkipReason::NotFound,
            Err(e) => SkipReason::LookupFailed(e.to_string()),
        };
        tracing::warn!(cart_item_id, reason = %reason, "skipping cart item");
        aggregation.skipped.push(SkippedCartItem { cart_item_id, reason });
    }
    aggregation
}
