//! In-memory implementation of every store contract.
//!
//! A [`MemoryTx`] stages its operations and replays them against a copy of the
//! committed tables on commit, swapping the copy in only if every operation succeeds.
//! Each staged operation is also validated eagerly, so constraint failures surface at
//! the call that causes them, as they would with a database.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use super::{CartStore, OrderStore, ProductStore, StoreError, Transaction, TransactionRunner, UserReader};
use crate::domain::aggregates::{CartItem, CartItemStatus, Customer, Order, Product, ProductError};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<i64, Customer>,
    cart_items: HashMap<i64, CartItem>,
    products: HashMap<i64, Product>,
    orders: Vec<Order>,
}

#[derive(Debug, Default)]
struct Faults {
    cart_reads: HashSet<i64>,
    transitions: HashSet<i64>,
    decrements: HashSet<i64>,
    insert: bool,
    commit: bool,
    latency: Option<Duration>,
}

#[derive(Debug, Clone)]
enum Op {
    InsertOrder(Order),
    Transition { id: i64, from: CartItemStatus, to: CartItemStatus },
    Decrement { product_id: i64, quantity: i32 },
}

fn apply(tables: &mut Tables, op: &Op) -> Result<(), StoreError> {
    match op {
        Op::InsertOrder(order) => {
            let key = order.idempotency_key();
            if tables.orders.iter().any(|o| o.idempotency_key() == key) {
                return Err(StoreError::DuplicateIdempotencyKey(key.to_string()));
            }
            tables.orders.push(order.clone());
        }
        Op::Transition { id, from, to } => {
            let item = tables.cart_items.get_mut(id)
                .ok_or_else(|| StoreError::NotFound { entity: "cart item", id: id.to_string() })?;
            item.transition(*from, *to).map_err(|_| StoreError::CartItemNotOpen(*id))?;
        }
        Op::Decrement { product_id, quantity } => {
            let product = tables.products.get_mut(product_id)
                .ok_or_else(|| StoreError::NotFound { entity: "product", id: product_id.to_string() })?;
            product.remove_stock(*quantity).map_err(|e| match e {
                ProductError::InsufficientStock { .. } => StoreError::StockConstraint { product_id: *product_id },
                other => StoreError::Corrupt(other.to_string()),
            })?;
        }
    }
    Ok(())
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Mutex<Faults>>,
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    fn tables(&self, during: &'static str) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::LockPoisoned(during))
    }

    fn faults(&self) -> MutexGuard<'_, Faults> { self.faults.lock().unwrap_or_else(PoisonError::into_inner) }

    fn snapshot(&self) -> MutexGuard<'_, Tables> { self.tables.lock().unwrap_or_else(PoisonError::into_inner) }

    async fn simulate_latency(&self) {
        let latency = self.faults().latency;
        if let Some(latency) = latency { tokio::time::sleep(latency).await; }
    }

    // Seeding and inspection

    pub fn insert_user(&self, user: Customer) { self.snapshot().users.insert(user.id, user); }
    pub fn insert_product(&self, product: Product) { self.snapshot().products.insert(product.id, product); }
    pub fn insert_cart_item(&self, item: CartItem) { self.snapshot().cart_items.insert(item.id, item); }

    pub fn set_stock(&self, product_id: i64, stock_quantity: i32) {
        if let Some(product) = self.snapshot().products.get_mut(&product_id) { product.stock_quantity = stock_quantity; }
    }

    pub fn product(&self, id: i64) -> Option<Product> { self.snapshot().products.get(&id).cloned() }
    pub fn cart_item(&self, id: i64) -> Option<CartItem> { self.snapshot().cart_items.get(&id).cloned() }
    pub fn orders(&self) -> Vec<Order> { self.snapshot().orders.clone() }
    pub fn commits(&self) -> usize { self.commits.load(Ordering::SeqCst) }
    pub fn rollbacks(&self) -> usize { self.rollbacks.load(Ordering::SeqCst) }

    // Fault injection

    pub fn fail_cart_read(&self, cart_item_id: i64) { self.faults().cart_reads.insert(cart_item_id); }
    pub fn fail_cart_transition(&self, cart_item_id: i64) { self.faults().transitions.insert(cart_item_id); }
    pub fn fail_stock_decrement(&self, product_id: i64) { self.faults().decrements.insert(product_id); }
    pub fn fail_order_insert(&self) { self.faults().insert = true; }
    pub fn fail_commit(&self) { self.faults().commit = true; }
    pub fn set_latency(&self, latency: Duration) { self.faults().latency = Some(latency); }
}

pub struct MemoryTx {
    store: MemoryStore,
    ops: Vec<Op>,
}

impl MemoryTx {
    pub fn staged(&self) -> usize { self.ops.len() }

    fn stage(&mut self, op: Op) -> Result<(), StoreError> {
        let mut preview = self.store.tables("stage")?.clone();
        for staged in &self.ops { apply(&mut preview, staged)?; }
        apply(&mut preview, &op)?;
        self.ops.push(op);
        Ok(())
    }
}

#[async_trait]
impl Transaction for MemoryTx {
    async fn commit(self) -> Result<(), StoreError> {
        if self.store.faults().commit { return Err(StoreError::Injected("commit".into())); }
        let mut tables = self.store.tables("commit")?;
        let mut next = tables.clone();
        for op in &self.ops { apply(&mut next, op)?; }
        *tables = next;
        self.store.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.store.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl TransactionRunner for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        Ok(MemoryTx { store: self.clone(), ops: Vec::new() })
    }
}

#[async_trait]
impl UserReader for MemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        self.simulate_latency().await;
        Ok(self.tables("find_user")?.users.get(&id).cloned())
    }
}

#[async_trait]
impl CartStore<MemoryTx> for MemoryStore {
    async fn get_cart_item(&self, id: i64) -> Result<Option<CartItem>, StoreError> {
        self.simulate_latency().await;
        if self.faults().cart_reads.contains(&id) { return Err(StoreError::Injected(format!("read cart item {id}"))); }
        Ok(self.tables("get_cart_item")?.cart_items.get(&id).cloned())
    }

    async fn transition_status(&self, tx: &mut MemoryTx, id: i64, from: CartItemStatus, to: CartItemStatus) -> Result<(), StoreError> {
        if self.faults().transitions.contains(&id) { return Err(StoreError::Injected(format!("transition cart item {id}"))); }
        tx.stage(Op::Transition { id, from, to })
    }
}

#[async_trait]
impl ProductStore<MemoryTx> for MemoryStore {
    async fn find_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        self.simulate_latency().await;
        Ok(self.tables("find_product")?.products.get(&id).cloned())
    }

    async fn decrement_stock(&self, tx: &mut MemoryTx, product_id: i64, quantity: i32) -> Result<(), StoreError> {
        if self.faults().decrements.contains(&product_id) { return Err(StoreError::Injected(format!("decrement product {product_id}"))); }
        tx.stage(Op::Decrement { product_id, quantity })
    }
}

#[async_trait]
impl OrderStore<MemoryTx> for MemoryStore {
    async fn find_order_id_by_idempotency_key(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.simulate_latency().await;
        let tables = self.tables("find_order_id_by_idempotency_key")?;
        Ok(tables.orders.iter().find(|o| o.idempotency_key().as_str() == key).map(|o| o.id().to_string()))
    }

    async fn insert_order(&self, tx: &mut MemoryTx, order: &Order) -> Result<(), StoreError> {
        if self.faults().insert { return Err(StoreError::Injected("insert order".into())); }
        tx.stage(Op::InsertOrder(order.clone()))
    }
}
