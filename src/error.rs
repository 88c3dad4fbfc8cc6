use crate::domain::order::OrderStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopError {
    #[error("not found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),
    #[error("cart is empty")]
    EmptyCart,
    #[error("payment amount mismatch: expected {expected}, got {presented}")]
    AmountMismatch { expected: i64, presented: i64 },
    #[error("payment declined by provider: {0}")]
    ProviderDeclined(String),
    #[error("payment provider unreachable: {0}")]
    ProviderUnreachable(String),
    #[error("order is not pending (status: {0})")]
    OrderNotPending(OrderStatus),
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: u32,
        requested: u32,
        available: u32,
    },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl ShopError {
    /// Whether the caller can sensibly retry the same request. A declined
    /// payment is not retryable as-is; the order stays payable but the
    /// customer has to change something.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ShopError::ProviderUnreachable(_))
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
