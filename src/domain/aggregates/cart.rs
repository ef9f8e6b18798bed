//! Cart items as seen by checkout

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub quantity: i32,
    pub status: CartItemStatus,
}

impl CartItem {
    pub fn is_open(&self) -> bool { self.status == CartItemStatus::Open }

    /// Moves the item to `to`, provided it is currently in `from` and the move is allowed.
    pub fn transition(&mut self, from: CartItemStatus, to: CartItemStatus) -> Result<(), CartError> {
        if self.status != from { return Err(CartError::UnexpectedStatus { id: self.id, expected: from, actual: self.status }); }
        if !from.can_transition_to(to) { return Err(CartError::IllegalTransition { from, to }); }
        self.status = to;
        Ok(())
    }
}

/// Lifecycle of a cart item. Checkout consumes `Open` items exactly once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartItemStatus {
    #[default]
    Open,
    Ordered,
}

impl CartItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Open => "open", Self::Ordered => "ordered" }
    }

    pub fn code(&self) -> i16 {
        match self { Self::Open => 0, Self::Ordered => 1 }
    }

    pub fn can_transition_to(&self, next: CartItemStatus) -> bool {
        matches!((self, next), (Self::Open, Self::Ordered))
    }
}

impl fmt::Display for CartItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for CartItemStatus {
    type Err = CartError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "ordered" => Ok(Self::Ordered),
            other => Err(CartError::UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<i16> for CartItemStatus {
    type Error = CartError;
    fn try_from(code: i16) -> Result<Self, Self::Error> {
        [Self::Open, Self::Ordered].into_iter().find(|status| status.code() == code)
            .ok_or_else(|| CartError::UnknownStatus(code.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Unknown cart item status {0:?}")]
    UnknownStatus(String),
    #[error("Cart item {id} is {actual}, expected {expected}")]
    UnexpectedStatus { id: i64, expected: CartItemStatus, actual: CartItemStatus },
    #[error("Cart item cannot move from {from} to {to}")]
    IllegalTransition { from: CartItemStatus, to: CartItemStatus },
}
