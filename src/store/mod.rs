//! Store contracts consumed by checkout.
//!
//! Reads run against committed state. Every mutation takes the open transaction of the
//! [`TransactionRunner`] it belongs to, so order insert, cart transitions and stock
//! decrements either all land or none do.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use crate::domain::aggregates::{CartItem, CartItemStatus, Customer, Order, Product};

pub use memory::{MemoryStore, MemoryTx};
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stock constraint violated for product {product_id}")]
    StockConstraint { product_id: i64 },
    #[error("idempotency key {0:?} already used")]
    DuplicateIdempotencyKey(String),
    #[error("cart item {0} is no longer open")]
    CartItemNotOpen(i64),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("injected failure: {0}")]
    Injected(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Transaction: Send + Sized {
    async fn commit(self) -> Result<(), StoreError>;
    async fn rollback(self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait TransactionRunner: Send + Sync {
    type Tx: Transaction + 'static;
    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// Commits `tx` when `result` is `Ok`, rolls it back otherwise.
///
/// A failed rollback is logged; the caller always sees the error that caused it.
pub async fn finish<Tx: Transaction, T>(tx: Tx, result: Result<T, StoreError>) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(cause) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, cause = %cause, "transaction rollback failed");
            }
            Err(cause)
        }
    }
}

#[async_trait]
pub trait UserReader: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<Customer>, StoreError>;
}

#[async_trait]
pub trait CartStore<Tx: Send>: Send + Sync {
    async fn get_cart_item(&self, id: i64) -> Result<Option<CartItem>, StoreError>;

    /// Fails with [`StoreError::CartItemNotOpen`] when the item is no longer in `from`.
    async fn transition_status(&self, tx: &mut Tx, id: i64, from: CartItemStatus, to: CartItemStatus) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ProductStore<Tx: Send>: Send + Sync {
    async fn find_product(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Fails with [`StoreError::StockConstraint`] when stock would go negative.
    async fn decrement_stock(&self, tx: &mut Tx, product_id: i64, quantity: i32) -> Result<(), StoreError>;
}

#[async_trait]
pub trait OrderStore<Tx: Send>: Send + Sync {
    async fn find_order_id_by_idempotency_key(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Fails with [`StoreError::DuplicateIdempotencyKey`] when the key is already taken.
    async fn insert_order(&self, tx: &mut Tx, order: &Order) -> Result<(), StoreError>;
}
