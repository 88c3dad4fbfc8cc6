//! Ports the application services are wired through. Infrastructure supplies
//! the implementations; tests and the CLI inject in-memory and sandbox ones.

use crate::domain::cart::CartItem;
use crate::domain::order::{Order, OrderItem, PaymentMethod, Recipient};
use crate::domain::payment::{PaymentSession, SettlementReceipt};
use crate::domain::product::Product;
use crate::domain::user::{Role, User};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type CartStoreRef = Arc<dyn CartStore>;
pub type OrderStoreRef = Arc<dyn OrderStore>;
pub type ProductCatalogRef = Arc<dyn ProductCatalog>;
pub type UserDirectoryRef = Arc<dyn UserDirectory>;
pub type InquiryStoreRef = Arc<dyn InquiryStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;

/// Per-user cart persistence. Quantity rules and price joins live in the
/// cart service; the store is plain storage.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn upsert(&self, item: CartItem) -> Result<CartItem>;
    async fn get(&self, user_id: u32, item_id: u64) -> Result<Option<CartItem>>;
    async fn find_by_product(&self, user_id: u32, product_id: u32) -> Result<Option<CartItem>>;
    /// Items in insertion order.
    async fn items(&self, user_id: u32) -> Result<Vec<CartItem>>;
    async fn remove(&self, user_id: u32, item_id: u64) -> Result<()>;
    async fn clear(&self, user_id: u32) -> Result<()>;
}

/// Durable order ledger.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order together with its frozen line items, atomically:
    /// a failure must not leave a partial order visible.
    async fn insert(&self, order: Order, items: Vec<OrderItem>) -> Result<()>;
    async fn get(&self, order_id: u32) -> Result<Option<Order>>;
    async fn items(&self, order_id: u32) -> Result<Vec<OrderItem>>;
    async fn update(&self, order: Order) -> Result<()>;
    /// A user's orders, newest first.
    async fn for_user(&self, user_id: u32) -> Result<Vec<Order>>;
    /// All orders, newest first.
    async fn all(&self) -> Result<Vec<Order>>;
    async fn next_id(&self) -> Result<u32>;
}

/// Read/adjust access to the collaborating catalog service.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get(&self, product_id: u32) -> Result<Option<Product>>;
    async fn all(&self) -> Result<Vec<Product>>;
    /// Stock delta, negative to decrement. Errors with `OutOfStock` when the
    /// decrement would go below zero.
    async fn adjust_stock(&self, product_id: u32, delta: i64) -> Result<()>;
}

/// The identity collaborator. The engine never authenticates; it reads.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get(&self, user_id: u32) -> Result<Option<User>>;
    async fn all(&self) -> Result<Vec<User>>;
    async fn set_role(&self, user_id: u32, role: Role) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    New,
    Contacted,
    Completed,
}

/// Plant-rental inquiry, handled entirely through the admin surface after
/// submission.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RentalInquiry {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub work_name: Option<String>,
    pub rental_period: Option<String>,
    pub purpose: Option<String>,
    pub message: Option<String>,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait InquiryStore: Send + Sync {
    async fn insert(&self, inquiry: RentalInquiry) -> Result<RentalInquiry>;
    async fn get(&self, inquiry_id: u32) -> Result<Option<RentalInquiry>>;
    async fn all(&self) -> Result<Vec<RentalInquiry>>;
    async fn update(&self, inquiry: RentalInquiry) -> Result<()>;
}

/// One contract over both provider styles. The payment service enforces the
/// amount and state invariants; implementations only talk to their provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn method(&self) -> PaymentMethod;

    /// Derives a payment session for a pending order. Must not create a
    /// payable charge, so calling it twice is harmless.
    async fn prepare(
        &self,
        order: &Order,
        items: &[OrderItem],
        customer: &User,
    ) -> Result<PaymentSession>;

    /// Captures funds for the order with the provider.
    async fn settle(&self, order: &Order, payment_ref: &str) -> Result<SettlementReceipt>;
}

/// What the order ledger needs to create an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub recipient: Recipient,
    pub payment_method: PaymentMethod,
    pub memo: Option<String>,
}
