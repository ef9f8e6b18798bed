//! Roastery Checkout
//!
//! Order checkout for the roastery storefront: turns selected cart items into a
//! durable, priced, idempotent order.
//!
//! ## Features
//! - Idempotency keys with store-enforced uniqueness
//! - Tolerant or strict cart aggregation
//! - Conservative stock policy with commit-time stock constraints
//! - One transaction for order insert, cart consumption and stock decrements
//! - Order-placed events over NATS

pub mod checkout;
pub mod config;
pub mod domain;
pub mod http;
pub mod ids;
pub mod publisher;
pub mod store;

use thiserror::Error;

pub use checkout::{CheckoutReceipt, CheckoutRequest, CheckoutSettings, CheckoutStores, OrderService};

// =============================================================================
// Error Types
// =============================================================================

/// Every way a checkout can fail. No variant leaves partial state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Idempotency key already used")]
    Conflict,

    #[error("No cart items left to order")]
    ItemsEmpty,

    #[error("Cart item {cart_item_id} is unavailable")]
    CartItemUnavailable { cart_item_id: i64 },

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    QuantityIssue { product_id: i64, requested: i32, available: i32 },

    #[error("Stock for product {product_id} ran out while placing the order")]
    QuantityIssueAtCommit { product_id: i64 },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Customer {0} not found")]
    CustomerNotFound(i64),

    #[error("Checkout deadline exceeded")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
