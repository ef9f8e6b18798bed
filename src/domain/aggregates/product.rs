//! Product read view used by checkout

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub bean_name: String,
    pub form_name: String,
    pub roasted_grade: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub image: String,
}

impl Product {
    pub fn is_in_stock(&self) -> bool { self.stock_quantity > 0 }

    /// Checkout never sells the last unit: the requested quantity must stay strictly
    /// below the stock on hand.
    pub fn can_fulfil(&self, quantity: i32) -> bool {
        quantity > 0 && self.is_in_stock() && quantity < self.stock_quantity
    }

    pub fn remove_stock(&mut self, quantity: i32) -> Result<(), ProductError> {
        if quantity <= 0 { return Err(ProductError::InvalidQuantity(quantity)); }
        let remaining = self.stock_quantity.checked_sub(quantity).filter(|r| *r >= 0)
            .ok_or(ProductError::InsufficientStock { available: self.stock_quantity, requested: quantity })?;
        self.stock_quantity = remaining;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { available: i32, requested: i32 },
    #[error("Invalid quantity {0}")]
    InvalidQuantity(i32),
}
