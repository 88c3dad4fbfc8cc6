use crate::domain::pricing::Quote;
use serde::{Deserialize, Serialize};

/// One line of a user's cart. Ephemeral: mutated by add/update/remove and
/// cleared after a successful checkout. Prices are never persisted here;
/// they are joined in from the catalog at read time.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CartItem {
    pub id: u64,
    pub user_id: u32,
    pub product_id: u32,
    pub quantity: u32,
}

/// A cart line with the current catalog price joined in.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct CartLine {
    pub item: CartItem,
    pub product_name: String,
    pub unit_price: i64,
    pub stock: u32,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.unit_price * i64::from(self.item.quantity)
    }
}

/// Point-in-time view of a cart. Reading a snapshot never charges or
/// reserves stock.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub quote: Quote,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line totals, before shipping. The full quote (with the
    /// shipping fee applied) sits alongside in `quote`.
    pub fn total_amount(&self) -> i64 {
        self.quote.subtotal
    }
}
