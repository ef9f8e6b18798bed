//! Order checkout.
//!
//! Turns a set of selected cart items into a priced, idempotent order. Everything up to
//! the commit is a read against committed state and decides only whether to attempt
//! the commit; the commit itself inserts the order, consumes the cart items and
//! decrements stock in one transaction, and the store's constraints are the final word
//! on stock and idempotency.

pub mod aggregation;
pub mod request;

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use crate::domain::aggregates::{CartItem, CartItemStatus, Order, OrderItem, ORDER_ID_PREFIX};
use crate::domain::events::OrderEvent;
use crate::domain::value_objects::IdempotencyKey;
use crate::ids::{OrderTokenGenerator, UuidTokenGenerator};
use crate::publisher::{EventPublisher, NoopPublisher};
use crate::store::{self, CartStore, OrderStore, ProductStore, StoreError, TransactionRunner, UserReader};
use crate::CheckoutError;

pub use aggregation::{aggregate, AggregationPolicy, CartAggregation, SkipReason, SkippedCartItem, UnknownPolicy};
pub use request::{CheckoutLine, CheckoutRequest, ValidatedCheckout};

/// Store collaborators, all bound to the transaction type of one runner.
pub struct CheckoutStores<Tx: Send> {
    pub users: Arc<dyn UserReader>,
    pub carts: Arc<dyn CartStore<Tx>>,
    pub products: Arc<dyn ProductStore<Tx>>,
    pub orders: Arc<dyn OrderStore<Tx>>,
}

impl<Tx: Send> Clone for CheckoutStores<Tx> {
    fn clone(&self) -> Self {
        Self { users: self.users.clone(), carts: self.carts.clone(), products: self.products.clone(), orders: self.orders.clone() }
    }
}

impl<Tx: Send> CheckoutStores<Tx> {
    /// Uses one backend for every store.
    pub fn backed_by<S>(store: S) -> Self
    where
        S: UserReader + CartStore<Tx> + ProductStore<Tx> + OrderStore<Tx> + 'static,
    {
        let store = Arc::new(store);
        Self { users: store.clone(), carts: store.clone(), products: store.clone(), orders: store }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub deadline: Duration,
    pub aggregation: AggregationPolicy,
}

impl Default for CheckoutSettings {
    fn default() -> Self { Self { deadline: Duration::from_secs(5), aggregation: AggregationPolicy::Tolerant } }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: String,
    pub total_price: Decimal,
    pub item_count: usize,
    pub skipped_cart_item_ids: Vec<i64>,
}

/// A cart item that passed stock validation, with its order snapshot.
#[derive(Debug, Clone)]
struct AcceptedLine {
    cart_item_id: i64,
    product_id: i64,
    quantity: i32,
    snapshot: OrderItem,
}

pub struct OrderService<R: TransactionRunner> {
    runner: R,
    stores: CheckoutStores<R::Tx>,
    ids: Arc<dyn OrderTokenGenerator>,
    events: Arc<dyn EventPublisher>,
    settings: CheckoutSettings,
}

impl<R: TransactionRunner> OrderService<R> {
    pub fn new(runner: R, stores: CheckoutStores<R::Tx>, settings: CheckoutSettings) -> Self {
        Self { runner, stores, ids: Arc::new(UuidTokenGenerator), events: Arc::new(NoopPublisher), settings }
    }

    pub fn with_token_generator(mut self, ids: Arc<dyn OrderTokenGenerator>) -> Self { self.ids = ids; self }
    pub fn with_publisher(mut self, events: Arc<dyn EventPublisher>) -> Self { self.events = events; self }

    /// Places an order for `customer_id` from the cart items named in `request`.
    ///
    /// Either the order, every cart status transition and every stock decrement are
    /// committed together, or nothing is. Everything up to and including the commit is
    /// bounded by the configured deadline; an expired deadline drops the open transaction
    /// uncommitted. Events are published once the order is committed and never turn the
    /// result into a failure.
    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn checkout(&self, idempotency_key: &str, request: CheckoutRequest, customer_id: i64) -> Result<CheckoutReceipt, CheckoutError> {
        let placed = tokio::time::timeout(self.settings.deadline, self.place_order(idempotency_key, request, customer_id)).await;
        let (receipt, events) = match placed {
            Ok(result) => result?,
            Err(_) => {
                warn!(deadline_ms = self.settings.deadline.as_millis() as u64, "checkout deadline elapsed");
                return Err(CheckoutError::Timeout);
            }
        };
        self.publish(&events).await;
        Ok(receipt)
    }

    async fn publish(&self, events: &[OrderEvent]) {
        for event in events {
            if let Err(e) = self.events.publish(event).await {
                warn!(order_id = event.order_id(), error = %e, "failed to publish order event");
            }
        }
    }

    async fn place_order(&self, idempotency_key: &str, request: CheckoutRequest, customer_id: i64) -> Result<(CheckoutReceipt, Vec<OrderEvent>), CheckoutError> {
        let key = IdempotencyKey::new(idempotency_key).map_err(|e| CheckoutError::Validation(e.to_string()))?;
        let checkout = request.into_validated()?;

        if let Some(existing) = self.stores.orders.find_order_id_by_idempotency_key(key.as_str()).await.map_err(internal)? {
            info!(order_id = %existing, "idempotency key already used");
            return Err(CheckoutError::Conflict);
        }

        let customer = self.stores.users.find_user(customer_id).await.map_err(internal)?
            .ok_or(CheckoutError::CustomerNotFound(customer_id))?;

        let aggregation = aggregate(self.stores.carts.as_ref(), &checkout.cart_item_ids).await;
        if self.settings.aggregation == AggregationPolicy::Strict {
            if let Some(skipped) = aggregation.skipped.first() {
                return Err(CheckoutError::CartItemUnavailable { cart_item_id: skipped.cart_item_id });
            }
        }

        let lines = self.price(&aggregation.resolved).await?;
        if lines.is_empty() { return Err(CheckoutError::ItemsEmpty); }

        let order_id = format!("{ORDER_ID_PREFIX}{}", self.ids.generate());
        let items = lines.iter().map(|l| l.snapshot.clone()).collect();
        let mut order = Order::place(order_id, key, customer.id, checkout.contact, checkout.shipping, items)
            .map_err(|_| CheckoutError::ItemsEmpty)?;
        let events = order.take_events();

        self.commit(&order, &lines).await?;
        info!(order_id = order.id(), total_price = %order.total_price(), items = lines.len(), "order placed");

        let receipt = CheckoutReceipt {
            order_id: order.id().to_string(),
            total_price: order.total_price(),
            item_count: order.items().len(),
            skipped_cart_item_ids: aggregation.skipped_ids(),
        };
        Ok((receipt, events))
    }

    /// Looks up each item's product, enforces the stock policy and snapshots it.
    async fn price(&self, resolved: &[CartItem]) -> Result<Vec<AcceptedLine>, CheckoutError> {
        let mut lines = Vec::with_capacity(resolved.len());
        for item in resolved {
            let product = self.stores.products.find_product(item.product_id).await.map_err(internal)?
                .ok_or_else(|| CheckoutError::Internal(format!("product {} of cart item {} not found", item.product_id, item.id)))?;
            if !product.can_fulfil(item.quantity) {
                return Err(CheckoutError::QuantityIssue { product_id: product.id, requested: item.quantity, available: product.stock_quantity });
            }
            lines.push(AcceptedLine {
                cart_item_id: item.id,
                product_id: product.id,
                quantity: item.quantity,
                snapshot: OrderItem::snapshot(&product, item.quantity),
            });
        }
        Ok(lines)
    }

    async fn commit(&self, order: &Order, lines: &[AcceptedLine]) -> Result<(), CheckoutError> {
        let mut tx = self.runner.begin().await.map_err(internal)?;
        let result = self.apply(&mut tx, order, lines).await;
        store::finish(tx, result).await.map_err(classify_commit_error)
    }

    async fn apply(&self, tx: &mut R::Tx, order: &Order, lines: &[AcceptedLine]) -> Result<(), StoreError> {
        self.stores.orders.insert_order(tx, order).await?;
        for line in lines {
            self.stores.carts.transition_status(tx, line.cart_item_id, CartItemStatus::Open, CartItemStatus::Ordered).await?;
        }
        for line in lines {
            self.stores.products.decrement_stock(tx, line.product_id, line.quantity).await?;
        }
        Ok(())
    }
}

fn internal(err: StoreError) -> CheckoutError {
    tracing::error!(error = %err, "store failure during checkout");
    CheckoutError::Internal(err.to_string())
}

fn classify_commit_error(err: StoreError) -> CheckoutError {
    match err {
        StoreError::StockConstraint { product_id } => CheckoutError::QuantityIssueAtCommit { product_id },
        StoreError::DuplicateIdempotencyKey(_) | StoreError::CartItemNotOpen(_) => {
            info!(error = %err, "checkout lost a race at commit");
            CheckoutError::Conflict
        }
        other => internal(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::domain::aggregates::{Customer, Product};
    use crate::publisher::{EventPublisher, PublishError, RecordingPublisher};
    use crate::store::{MemoryStore, MemoryTx};

    struct FixedTokens;
    impl OrderTokenGenerator for FixedTokens {
        fn generate(&self) -> String { "TEST0001".into() }
    }

    fn product(id: i64, bean: &str, price: Decimal, stock: i32) -> Product {
        Product { id, bean_name: bean.into(), form_name: "Whole bean".into(), roasted_grade: "Medium".into(), price, stock_quantity: stock, image: format!("{id}.png") }
    }

    fn cart_item(id: i64, product_id: i64, quantity: i32) -> CartItem {
        CartItem { id, product_id, user_id: 7, quantity, status: CartItemStatus::Open }
    }

    fn request(cart_item_ids: &[i64]) -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "Ada Lovelace".into(), customer_email: "ada@example.com".into(),
            phone_number: "+1 (415) 123-4567".into(), alternative_phone_number: None,
            street: "1 Market St".into(), city: "San Francisco".into(),
            items: cart_item_ids.iter().map(|&id| CheckoutLine { cart_item_id: id, quantity: None }).collect(),
        }
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_user(Customer { id: 7, name: "Ada Lovelace".into(), email: "ada@example.com".into() });
        store.insert_product(product(1, "Sidamo", Decimal::new(100, 1), 10));
        store.insert_product(product(2, "Huila", Decimal::new(55, 1), 10));
        store.insert_cart_item(cart_item(11, 1, 2));
        store.insert_cart_item(cart_item(12, 2, 3));
        store
    }

    fn service(store: &MemoryStore) -> OrderService<MemoryStore> {
        OrderService::new(store.clone(), CheckoutStores::backed_by(store.clone()), CheckoutSettings::default())
            .with_token_generator(Arc::new(FixedTokens))
    }

    fn assert_untouched(store: &MemoryStore) {
        assert!(store.orders().is_empty());
        assert_eq!(store.product(1).unwrap().stock_quantity, 10);
        assert_eq!(store.product(2).unwrap().stock_quantity, 10);
        assert_eq!(store.cart_item(11).unwrap().status, CartItemStatus::Open);
        assert_eq!(store.cart_item(12).unwrap().status, CartItemStatus::Open);
    }

    #[tokio::test]
    async fn test_checkout_prices_and_commits() {
        let store = seeded();
        let receipt = service(&store).checkout("key-1", request(&[11, 12]), 7).await.unwrap();

        assert_eq!(receipt.order_id, "ORD-TEST0001");
        assert_eq!(receipt.total_price, Decimal::new(365, 1));
        assert_eq!(receipt.item_count, 2);
        assert!(receipt.skipped_cart_item_ids.is_empty());

        let orders = store.orders();
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.customer_id(), 7);
        assert_eq!(order.items().iter().map(|i| i.bean_name.as_str()).collect::<Vec<_>>(), vec!["Sidamo", "Huila"]);
        assert_eq!(order.shipping().phone_number.as_str(), "+14151234567");
        assert_eq!(store.product(1).unwrap().stock_quantity, 8);
        assert_eq!(store.product(2).unwrap().stock_quantity, 7);
        assert_eq!(store.cart_item(11).unwrap().status, CartItemStatus::Ordered);
        assert_eq!(store.cart_item(12).unwrap().status, CartItemStatus::Ordered);
        assert_eq!(store.commits(), 1);
    }

    #[tokio::test]
    async fn test_replayed_key_conflicts_without_mutation() {
        let store = seeded();
        store.insert_cart_item(cart_item(13, 1, 1));
        let svc = service(&store);
        svc.checkout("key-1", request(&[11]), 7).await.unwrap();

        let err = svc.checkout("key-1", request(&[13]), 7).await.unwrap_err();
        assert_eq!(err, CheckoutError::Conflict);
        assert_eq!(store.orders().len(), 1);
        assert_eq!(store.product(1).unwrap().stock_quantity, 8);
        assert_eq!(store.cart_item(13).unwrap().status, CartItemStatus::Open);
        assert_eq!(store.commits(), 1);
    }

    #[tokio::test]
    async fn test_quantity_at_or_above_stock_is_rejected() {
        let store = seeded();
        store.set_stock(2, 3);
        let err = service(&store).checkout("key-1", request(&[11, 12]), 7).await.unwrap_err();
        assert_eq!(err, CheckoutError::QuantityIssue { product_id: 2, requested: 3, available: 3 });
        assert!(store.orders().is_empty());
        assert_eq!(store.product(1).unwrap().stock_quantity, 10);
        assert_eq!(store.product(2).unwrap().stock_quantity, 3);
        assert_eq!(store.cart_item(11).unwrap().status, CartItemStatus::Open);
        assert_eq!(store.commits() + store.rollbacks(), 0);
    }

    #[tokio::test]
    async fn test_out_of_stock_is_rejected() {
        let store = seeded();
        store.set_stock(1, 0);
        let err = service(&store).checkout("key-1", request(&[11]), 7).await.unwrap_err();
        assert!(matches!(err, CheckoutError::QuantityIssue { product_id: 1, available: 0, .. }));
    }

    #[tokio::test]
    async fn test_all_cart_ids_unresolvable_is_items_empty() {
        let store = seeded();
        store.fail_cart_read(12);
        let err = service(&store).checkout("key-1", request(&[98, 99, 12]), 7).await.unwrap_err();
        assert_eq!(err, CheckoutError::ItemsEmpty);
        assert_untouched(&store);
    }

    #[tokio::test]
    async fn test_tolerant_aggregation_reports_skipped_ids() {
        let store = seeded();
        store.insert_cart_item(CartItem { status: CartItemStatus::Ordered, ..cart_item(13, 2, 1) });
        let receipt = service(&store).checkout("key-1", request(&[11, 99, 13]), 7).await.unwrap();
        assert_eq!(receipt.item_count, 1);
        assert_eq!(receipt.skipped_cart_item_ids, vec![99, 13]);
        assert_eq!(store.product(2).unwrap().stock_quantity, 10);
    }

    #[tokio::test]
    async fn test_strict_aggregation_fails_on_skipped_id() {
        let store = seeded();
        let svc = OrderService::new(store.clone(), CheckoutStores::backed_by(store.clone()),
            CheckoutSettings { aggregation: AggregationPolicy::Strict, ..CheckoutSettings::default() });
        let err = svc.checkout("key-1", request(&[11, 99]), 7).await.unwrap_err();
        assert_eq!(err, CheckoutError::CartItemUnavailable { cart_item_id: 99 });
        assert_untouched(&store);
    }

    #[tokio::test]
    async fn test_failed_last_decrement_rolls_back_everything() {
        let store = seeded();
        store.fail_stock_decrement(2);
        let err = service(&store).checkout("key-1", request(&[11, 12]), 7).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Internal(_)));
        assert_untouched(&store);
        assert_eq!(store.rollbacks(), 1);
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_nothing_behind() {
        let store = seeded();
        store.fail_commit();
        let err = service(&store).checkout("key-1", request(&[11, 12]), 7).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Internal(_)));
        assert_untouched(&store);
    }

    #[tokio::test]
    async fn test_failed_transition_rolls_back_insert() {
        let store = seeded();
        store.fail_cart_transition(12);
        assert!(service(&store).checkout("key-1", request(&[11, 12]), 7).await.is_err());
        assert_untouched(&store);
    }

    #[tokio::test]
    async fn test_invalid_phone_fails_before_any_store_call() {
        let store = seeded();
        store.fail_cart_read(11);
        store.fail_order_insert();
        let mut r = request(&[11]);
        r.phone_number = "+1 415 12E 4567".into();
        let err = service(&store).checkout("key-1", r, 999).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
        assert_untouched(&store);
    }

    #[tokio::test]
    async fn test_blank_idempotency_key_is_invalid() {
        let store = seeded();
        let err = service(&store).checkout("  ", request(&[11]), 7).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_customer_is_internal_inconsistency() {
        let store = seeded();
        let err = service(&store).checkout("key-1", request(&[11]), 8).await.unwrap_err();
        assert_eq!(err, CheckoutError::CustomerNotFound(8));
        assert_untouched(&store);
    }

    #[tokio::test]
    async fn test_missing_product_is_internal() {
        let store = seeded();
        store.insert_cart_item(cart_item(13, 404, 1));
        let err = service(&store).checkout("key-1", request(&[13]), 7).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Internal(_)));
    }

    #[tokio::test]
    async fn test_publishes_event_after_commit() {
        let store = seeded();
        let events = Arc::new(RecordingPublisher::default());
        let svc = service(&store).with_publisher(events.clone());
        svc.checkout("key-1", request(&[11]), 7).await.unwrap();
        let published = events.events();
        assert_eq!(published.len(), 1);
        assert!(matches!(&published[0], OrderEvent::Placed { order_id, customer_id: 7, item_count: 1, .. } if order_id == "ORD-TEST0001"));
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_checkout() {
        let store = seeded();
        let svc = service(&store).with_publisher(Arc::new(RecordingPublisher::failing()));
        assert!(svc.checkout("key-1", request(&[11]), 7).await.is_ok());
        assert_eq!(store.orders().len(), 1);
    }

    /// Takes longer to publish than the checkout deadline allows.
    struct SlowPublisher { delay: Duration, inner: RecordingPublisher }

    #[async_trait]
    impl EventPublisher for SlowPublisher {
        async fn publish(&self, event: &OrderEvent) -> Result<(), PublishError> {
            tokio::time::sleep(self.delay).await;
            self.inner.publish(event).await
        }
    }

    #[tokio::test]
    async fn test_slow_publish_after_commit_still_succeeds() {
        let store = seeded();
        let events = Arc::new(SlowPublisher { delay: Duration::from_millis(300), inner: RecordingPublisher::default() });
        let svc = OrderService::new(store.clone(), CheckoutStores::backed_by(store.clone()),
            CheckoutSettings { deadline: Duration::from_millis(100), ..CheckoutSettings::default() })
            .with_token_generator(Arc::new(FixedTokens))
            .with_publisher(events.clone());

        let receipt = svc.checkout("key-1", request(&[11]), 7).await.unwrap();
        assert_eq!(receipt.order_id, "ORD-TEST0001");
        assert_eq!(store.orders().len(), 1);
        assert_eq!(store.product(1).unwrap().stock_quantity, 8);
        assert_eq!(store.cart_item(11).unwrap().status, CartItemStatus::Ordered);
        assert_eq!(events.inner.events().len(), 1);
    }

    #[tokio::test]
    async fn test_deadline_drops_uncommitted_work() {
        let store = seeded();
        store.set_latency(Duration::from_millis(200));
        let svc = OrderService::new(store.clone(), CheckoutStores::backed_by(store.clone()),
            CheckoutSettings { deadline: Duration::from_millis(50), ..CheckoutSettings::default() });
        let err = svc.checkout("key-1", request(&[11]), 7).await.unwrap_err();
        assert_eq!(err, CheckoutError::Timeout);
        assert_untouched(&store);
    }

    /// Hands out the stock it read, then lets a competing checkout drain it.
    struct DrainedAfterRead { inner: MemoryStore }

    #[async_trait]
    impl ProductStore<MemoryTx> for DrainedAfterRead {
        async fn find_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
            let product = self.inner.find_product(id).await?;
            self.inner.set_stock(id, 1);
            Ok(product)
        }
        async fn decrement_stock(&self, tx: &mut MemoryTx, product_id: i64, quantity: i32) -> Result<(), StoreError> {
            self.inner.decrement_stock(tx, product_id, quantity).await
        }
    }

    #[tokio::test]
    async fn test_stock_drained_between_read_and_commit() {
        let store = seeded();
        let stores: CheckoutStores<MemoryTx> = CheckoutStores { products: Arc::new(DrainedAfterRead { inner: store.clone() }), ..CheckoutStores::backed_by(store.clone()) };
        let svc = OrderService::new(store.clone(), stores, CheckoutSettings::default());
        let err = svc.checkout("key-1", request(&[11]), 7).await.unwrap_err();
        assert_eq!(err, CheckoutError::QuantityIssueAtCommit { product_id: 1 });
        assert!(store.orders().is_empty());
        assert_eq!(store.product(1).unwrap().stock_quantity, 1);
        assert_eq!(store.cart_item(11).unwrap().status, CartItemStatus::Open);
    }

    /// Never sees committed orders, like a request racing another with the same key.
    struct BlindOrderLookup { inner: MemoryStore }

    #[async_trait]
    impl OrderStore<MemoryTx> for BlindOrderLookup {
        async fn find_order_id_by_idempotency_key(&self, _key: &str) -> Result<Option<String>, StoreError> { Ok(None) }
        async fn insert_order(&self, tx: &mut MemoryTx, order: &Order) -> Result<(), StoreError> {
            self.inner.insert_order(tx, order).await
        }
    }

    #[tokio::test]
    async fn test_unique_key_is_authoritative_when_precheck_misses() {
        let store = seeded();
        store.insert_cart_item(cart_item(13, 1, 1));
        let stores: CheckoutStores<MemoryTx> = CheckoutStores { orders: Arc::new(BlindOrderLookup { inner: store.clone() }), ..CheckoutStores::backed_by(store.clone()) };
        let svc = OrderService::new(store.clone(), stores, CheckoutSettings::default());

        svc.checkout("key-1", request(&[11]), 7).await.unwrap();
        let err = svc.checkout("key-1", request(&[13]), 7).await.unwrap_err();
        assert_eq!(err, CheckoutError::Conflict);
        assert_eq!(store.orders().len(), 1);
        assert_eq!(store.product(1).unwrap().stock_quantity, 8);
        assert_eq!(store.cart_item(13).unwrap().status, CartItemStatus::Open);
    }

    #[tokio::test]
    async fn test_concurrent_checkouts_share_stock_safely() {
        let store = MemoryStore::new();
        store.insert_user(Customer { id: 7, name: "Ada".into(), email: "ada@example.com".into() });
        store.insert_product(product(1, "Sidamo", Decimal::new(12, 0), 4));
        store.insert_cart_item(cart_item(21, 1, 2));
        store.insert_cart_item(cart_item(22, 1, 2));
        let svc = Arc::new(OrderService::new(store.clone(), CheckoutStores::backed_by(store.clone()), CheckoutSettings::default()));

        let a = tokio::spawn({ let svc = svc.clone(); async move { svc.checkout("key-a", request(&[21]), 7).await } });
        let b = tokio::spawn({ let svc = svc.clone(); async move { svc.checkout("key-b", request(&[22]), 7).await } });
        let results = [a.await.unwrap(), b.await.unwrap()];

        let placed = results.iter().filter(|r| r.is_ok()).count();
        assert!(store.product(1).unwrap().stock_quantity >= 0);
        assert_eq!(store.orders().len(), placed);
        assert_eq!(store.product(1).unwrap().stock_quantity, 4 - 2 * placed as i32);
    }
}
