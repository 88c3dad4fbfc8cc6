use crate::application::cart::CartService;
use crate::application::locks::LockMap;
use crate::domain::cart::CartSnapshot;
use crate::domain::order::{generate_order_number, Actor, Order, OrderItem, OrderStatus};
use crate::domain::ports::{CartStoreRef, NewOrder, OrderStoreRef, ProductCatalogRef};
use crate::domain::user::User;
use crate::error::{Result, ShopError};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// The order ledger: creates orders from cart snapshots, reads them back
/// with ownership checks, and handles customer cancellation.
#[derive(Clone)]
pub struct OrderService {
    carts: CartService,
    cart_store: CartStoreRef,
    catalog: ProductCatalogRef,
    orders: OrderStoreRef,
    /// Shared with the payment service so a cancel and a confirm of the same
    /// order never interleave.
    order_locks: Arc<LockMap<u32>>,
    /// Shared with the cart service; makes "snapshot cart, persist order,
    /// clear cart" atomic against concurrent cart edits by the same user.
    user_locks: Arc<LockMap<u32>>,
}

impl OrderService {
    pub fn new(
        carts: CartService,
        cart_store: CartStoreRef,
        catalog: ProductCatalogRef,
        orders: OrderStoreRef,
        order_locks: Arc<LockMap<u32>>,
        user_locks: Arc<LockMap<u32>>,
    ) -> Self {
        Self {
            carts,
            cart_store,
            catalog,
            orders,
            order_locks,
            user_locks,
        }
    }

    /// Creates an order from the user's live cart. Pricing is re-derived
    /// here; client-submitted totals are never trusted. Stock is decremented
    /// at creation time and restored on cancel.
    pub async fn create_order(&self, user: &User, request: NewOrder) -> Result<Order> {
        request.recipient.validate()?;

        let _checkout = self.user_locks.acquire(user.id).await;

        let snapshot = self.carts.snapshot(user).await?;
        if snapshot.is_empty() {
            return Err(ShopError::EmptyCart);
        }
        self.check_stock(&snapshot)?;

        let now = Utc::now();
        let order_id = self.orders.next_id().await?;
        let order = Order {
            id: order_id,
            user_id: user.id,
            order_number: generate_order_number(now),
            status: OrderStatus::Pending,
            total_amount: snapshot.quote.total,
            shipping_fee: snapshot.quote.shipping_fee,
            recipient: request.recipient,
            memo: request.memo,
            payment_method: request.payment_method,
            payment_key: None,
            payment_test_mode: false,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };

        let items: Vec<OrderItem> = snapshot
            .lines
            .iter()
            .map(|line| OrderItem {
                id: 0, // assigned by the ledger
                order_id,
                product_id: line.item.product_id,
                product_name: line.product_name.clone(),
                unit_price: line.unit_price,
                quantity: line.item.quantity,
            })
            .collect();

        // Reserve stock first so the insert below cannot oversell; undo the
        // reservations if anything later fails.
        self.take_stock(&snapshot).await?;
        if let Err(e) = self.orders.insert(order.clone(), items).await {
            self.give_back_stock(&snapshot).await;
            return Err(e);
        }
        self.cart_store.clear(user.id).await?;

        info!(
            order_id = order.id,
            order_number = %order.order_number,
            total = order.total_amount,
            "order created"
        );
        Ok(order)
    }

    /// `NotFound` when the order is absent or belongs to someone else;
    /// foreign existence is never revealed. Admins see every order.
    pub async fn get_order(&self, user: &User, order_id: u32) -> Result<(Order, Vec<OrderItem>)> {
        let order = self.load_owned(user, order_id).await?;
        let items = self.orders.items(order_id).await?;
        Ok((order, items))
    }

    /// The user's orders, newest first, with item counts.
    pub async fn list_orders(&self, user: &User) -> Result<Vec<(Order, usize)>> {
        let orders = self.orders.for_user(user.id).await?;
        let mut out = Vec::with_capacity(orders.len());
        for order in orders {
            let count = self.orders.items(order.id).await?.len();
            out.push((order, count));
        }
        Ok(out)
    }

    /// Customer/admin cancellation. Legal from `pending` and `paid` only.
    /// Restores stock. Reversing an external capture of a `paid` order is a
    /// provider refund, handled by a collaborator, not here.
    pub async fn cancel(&self, user: &User, order_id: u32) -> Result<Order> {
        let _guard = self.order_locks.acquire(order_id).await;

        let mut order = self.load_owned(user, order_id).await?;
        let actor = if user.is_admin() {
            Actor::Admin
        } else {
            Actor::Customer(user.id)
        };
        order.transition(OrderStatus::Cancelled, actor)?;

        // The ledger write is the commit point; stock is returned only once
        // the cancellation is durable.
        self.orders.update(order.clone()).await?;
        for item in self.orders.items(order_id).await? {
            if let Err(e) = self
                .catalog
                .adjust_stock(item.product_id, i64::from(item.quantity))
                .await
            {
                warn!(
                    order_id,
                    product_id = item.product_id,
                    error = %e,
                    "failed to restore stock for cancelled order"
                );
            }
        }

        info!(order_id, "order cancelled");
        Ok(order)
    }

    async fn load_owned(&self, user: &User, order_id: u32) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .filter(|o| o.user_id == user.id || user.is_admin())
            .ok_or(ShopError::NotFound)
    }

    fn check_stock(&self, snapshot: &CartSnapshot) -> Result<()> {
        for line in &snapshot.lines {
            if line.item.quantity > line.stock {
                return Err(ShopError::OutOfStock {
                    product_id: line.item.product_id,
                    requested: line.item.quantity,
                    available: line.stock,
                });
            }
        }
        Ok(())
    }

    async fn take_stock(&self, snapshot: &CartSnapshot) -> Result<()> {
        for (i, line) in snapshot.lines.iter().enumerate() {
            if let Err(e) = self
                .catalog
                .adjust_stock(line.item.product_id, -i64::from(line.item.quantity))
                .await
            {
                // Undo what we already took.
                for done in &snapshot.lines[..i] {
                    let _ = self
                        .catalog
                        .adjust_stock(done.item.product_id, i64::from(done.item.quantity))
                        .await;
                }
                return Err(e);
            }
        }
        Ok(())
    }

    async fn give_back_stock(&self, snapshot: &CartSnapshot) {
        for line in &snapshot.lines {
            let _ = self
                .catalog
                .adjust_stock(line.item.product_id, i64::from(line.item.quantity))
                .await;
        }
    }
}
