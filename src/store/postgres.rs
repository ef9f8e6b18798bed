//! PostgreSQL implementation of the store contracts.
//!
//! The schema in `migrations/` carries the constraints the commit protocol relies on:
//! `CHECK (stock_quantity >= 0)` on products and a unique index on
//! `orders.idempotency_key`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Postgres;
use super::{CartStore, OrderStore, ProductStore, StoreError, Transaction, TransactionRunner, UserReader};
use crate::domain::aggregates::{CartItem, CartItemStatus, Customer, Order, Product};

const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";
const STOCK_CHECK: &str = "products_stock_non_negative";
const IDEMPOTENCY_KEY_INDEX: &str = "orders_idempotency_key_idx";

pub type PgTx = sqlx::Transaction<'static, Postgres>;

#[derive(Clone)]
pub struct PgStore { pool: PgPool }

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(database_url).await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Whether `err` is a `code` violation of the named constraint.
fn violates(err: &sqlx::Error, code: &str, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => is_violation(db.code().as_deref(), db.constraint(), code, constraint),
        _ => false,
    }
}

fn is_violation(found_code: Option<&str>, found_constraint: Option<&str>, code: &str, constraint: &str) -> bool {
    found_code == Some(code) && found_constraint == Some(constraint)
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow { id: i64, name: String, email: String }

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow { id: i64, product_id: i64, user_id: i64, quantity: i32, status: String }

impl TryFrom<CartItemRow> for CartItem {
    type Error = StoreError;
    fn try_from(r: CartItemRow) -> Result<Self, Self::Error> {
        let status = r.status.parse::<CartItemStatus>().map_err(|e| StoreError::Corrupt(format!("cart_items.id={}: {e}", r.id)))?;
        Ok(CartItem { id: r.id, product_id: r.product_id, user_id: r.user_id, quantity: r.quantity, status })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow { id: i64, bean_name: String, form_name: String, roasted_grade: String, price: Decimal, stock_quantity: i32, image: String }

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product { id: r.id, bean_name: r.bean_name, form_name: r.form_name, roasted_grade: r.roasted_grade, price: r.price, stock_quantity: r.stock_quantity, image: r.image }
    }
}

#[async_trait]
impl Transaction for PgTx {
    async fn commit(self) -> Result<(), StoreError> { Ok(sqlx::Transaction::commit(self).await?) }
    async fn rollback(self) -> Result<(), StoreError> { Ok(sqlx::Transaction::rollback(self).await?) }
}

#[async_trait]
impl TransactionRunner for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, StoreError> { Ok(self.pool.begin().await?) }
}

#[async_trait]
impl UserReader for PgStore {
    async fn find_user(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| Customer { id: r.id, name: r.name, email: r.email }))
    }
}

#[async_trait]
impl CartStore<PgTx> for PgStore {
    async fn get_cart_item(&self, id: i64) -> Result<Option<CartItem>, StoreError> {
        sqlx::query_as::<_, CartItemRow>("SELECT id, product_id, user_id, quantity, status FROM cart_items WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?
            .map(CartItem::try_from).transpose()
    }

    async fn transition_status(&self, tx: &mut PgTx, id: i64, from: CartItemStatus, to: CartItemStatus) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE cart_items SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2")
            .bind(id).bind(from.as_str()).bind(to.as_str())
            .execute(&mut **tx).await?;
        if result.rows_affected() == 0 { return Err(StoreError::CartItemNotOpen(id)); }
        Ok(())
    }
}

#[async_trait]
impl ProductStore<PgTx> for PgStore {
    async fn find_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT id, bean_name, form_name, roasted_grade, price, stock_quantity, image FROM products WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(Product::from))
    }

    async fn decrement_stock(&self, tx: &mut PgTx, product_id: i64, quantity: i32) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE products SET stock_quantity = stock_quantity - $2, updated_at = NOW() WHERE id = $1 AND stock_quantity >= $2")
            .bind(product_id).bind(quantity)
            .execute(&mut **tx).await
            .map_err(|e| if violates(&e, CHECK_VIOLATION, STOCK_CHECK) {
                StoreError::StockConstraint { product_id }
            } else {
                StoreError::Database(e)
            })?;
        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1").bind(product_id).fetch_optional(&mut **tx).await?;
            return Err(match exists {
                Some(_) => StoreError::StockConstraint { product_id },
                None => StoreError::NotFound { entity: "product", id: product_id.to_string() },
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore<PgTx> for PgStore {
    async fn find_order_id_by_idempotency_key(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM orders WHERE idempotency_key = $1")
            .bind(key).fetch_optional(&self.pool).await?;
        Ok(row.map(|(id,)| id))
    }

    async fn insert_order(&self, tx: &mut PgTx, order: &Order) -> Result<(), StoreError> {
        let shipping = order.shipping();
        let created_at: DateTime<Utc> = order.created_at();
        sqlx::query("INSERT INTO orders (id, idempotency_key, customer_id, customer_name, customer_email, items, total_price, phone_number, alternative_phone_number, street, city, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)")
            .bind(order.id()).bind(order.idempotency_key().as_str()).bind(order.customer_id())
            .bind(order.customer_name()).bind(order.customer_email()).bind(Json(order.items()))
            .bind(order.total_price()).bind(shipping.phone_number.as_str())
            .bind(shipping.alternative_phone_number.as_ref().map(|p| p.as_str()))
            .bind(&shipping.street).bind(&shipping.city).bind(order.status().as_str()).bind(created_at)
            .execute(&mut **tx).await
            .map_err(|e| if violates(&e, UNIQUE_VIOLATION, IDEMPOTENCY_KEY_INDEX) {
                StoreError::DuplicateIdempotencyKey(order.idempotency_key().to_string())
            } else {
                StoreError::Database(e)
            })?;
        Ok(())
    }
}
