//! Aggregates module
pub mod customer;
pub mod product;
pub mod order;
pub mod cart;

pub use customer::Customer;
pub use product::{Product, ProductError};
pub use order::{Order, OrderError, OrderStatus, OrderItem, CustomerContact, ShippingDetails, ORDER_ID_PREFIX};
pub use cart::{CartError, CartItem, CartItemStatus};
