use crate::application::locks::LockMap;
use crate::domain::order::{Actor, Order, OrderStatus, PaymentMethod};
use crate::domain::payment::{PaymentSession, SettlementReceipt};
use crate::domain::ports::{OrderStoreRef, PaymentGatewayRef};
use crate::domain::user::User;
use crate::error::{Result, ShopError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Reconciles both external providers into one consistent order state.
///
/// The amount and state invariants are enforced here, once, for every
/// gateway: a confirmation only ever resolves an order to `paid`, or leaves
/// it `pending` with a surfaced reason. Nothing is swallowed.
#[derive(Clone)]
pub struct PaymentService {
    orders: OrderStoreRef,
    gateways: HashMap<PaymentMethod, PaymentGatewayRef>,
    order_locks: Arc<LockMap<u32>>,
}

/// Read-through view for the payment status endpoint.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct PaymentStatus {
    pub order_id: u32,
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub paid_at: Option<DateTime<Utc>>,
}

impl PaymentService {
    pub fn new(
        orders: OrderStoreRef,
        gateways: Vec<PaymentGatewayRef>,
        order_locks: Arc<LockMap<u32>>,
    ) -> Self {
        let gateways = gateways.into_iter().map(|g| (g.method(), g)).collect();
        Self {
            orders,
            gateways,
            order_locks,
        }
    }

    /// Derives the payment session for a pending order. Idempotent: sessions
    /// come from stored order fields, so no second payable charge can exist.
    pub async fn prepare(&self, user: &User, order_id: u32) -> Result<PaymentSession> {
        let order = self.load_owned(user, order_id).await?;
        if order.status != OrderStatus::Pending {
            return Err(ShopError::OrderNotPending(order.status));
        }

        let items = self.orders.items(order_id).await?;
        self.gateway(order.payment_method)?
            .prepare(&order, &items, user)
            .await
    }

    /// Redirect-settlement approval. In sandbox mode this is invoked
    /// synchronously without a real redirect.
    pub async fn approve_redirect(
        &self,
        user: &User,
        order_id: u32,
        payment_ref: &str,
    ) -> Result<SettlementReceipt> {
        self.settle(user, order_id, payment_ref, None).await
    }

    /// Widget confirmation. `amount` is what the widget reported charging;
    /// it must equal the order's stored total exactly.
    pub async fn confirm_widget(
        &self,
        user: &User,
        order_id: u32,
        payment_key: &str,
        amount: i64,
    ) -> Result<SettlementReceipt> {
        self.settle(user, order_id, payment_key, Some(amount)).await
    }

    pub async fn payment_status(&self, user: &User, order_id: u32) -> Result<PaymentStatus> {
        let order = self.load_owned(user, order_id).await?;
        Ok(PaymentStatus {
            order_id: order.id,
            order_number: order.order_number,
            status: order.status,
            total_amount: order.total_amount,
            paid_at: order.paid_at,
        })
    }

    /// The one settlement path. Holds the order lock for the whole
    /// check-settle-transition sequence so a concurrent cancel can never
    /// interleave and produce an order that is both paid and cancelled.
    async fn settle(
        &self,
        user: &User,
        order_id: u32,
        payment_ref: &str,
        presented_amount: Option<i64>,
    ) -> Result<SettlementReceipt> {
        let _guard = self.order_locks.acquire(order_id).await;

        let mut order = self.load_owned(user, order_id).await?;

        if let Some(presented) = presented_amount {
            if presented != order.total_amount {
                warn!(
                    order_id,
                    expected = order.total_amount,
                    presented,
                    "payment confirmation with mismatched amount"
                );
                return Err(ShopError::AmountMismatch {
                    expected: order.total_amount,
                    presented,
                });
            }
        }

        // A repeated confirm of an already-paid order is a safe no-op, not a
        // second charge record.
        if order.status == OrderStatus::Paid {
            return Ok(SettlementReceipt {
                payment_key: order.payment_key.unwrap_or_default(),
                amount: order.total_amount,
                test_mode: order.payment_test_mode,
            });
        }
        if order.status != OrderStatus::Pending {
            warn!(order_id, status = %order.status, "confirm on non-pending order");
            return Err(ShopError::OrderNotPending(order.status));
        }

        let receipt = self
            .gateway(order.payment_method)?
            .settle(&order, payment_ref)
            .await?;

        if receipt.amount != order.total_amount {
            warn!(
                order_id,
                expected = order.total_amount,
                settled = receipt.amount,
                "provider settled a different amount; order left pending"
            );
            return Err(ShopError::AmountMismatch {
                expected: order.total_amount,
                presented: receipt.amount,
            });
        }

        order.transition(OrderStatus::Paid, Actor::System)?;
        order.payment_key = Some(receipt.payment_key.clone());
        order.payment_test_mode = receipt.test_mode;
        order.paid_at = Some(Utc::now());
        self.orders.update(order).await?;

        info!(
            order_id,
            payment_key = %receipt.payment_key,
            test_mode = receipt.test_mode,
            "payment settled"
        );
        Ok(receipt)
    }

    fn gateway(&self, method: PaymentMethod) -> Result<&PaymentGatewayRef> {
        self.gateways.get(&method).ok_or_else(|| {
            ShopError::Internal(format!("no gateway configured for {method:?}").into())
        })
    }

    async fn load_owned(&self, user: &User, order_id: u32) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .filter(|o| o.user_id == user.id || user.is_admin())
            .ok_or(ShopError::NotFound)
    }
}
