//! Pricing calculator shared by cart display and order creation.
//!
//! Both paths must run through the same function so that a persisted order's
//! `total_amount` always equals the quote for its frozen line items.

use serde::Serialize;

/// Orders at or above this subtotal ship for free.
pub const FREE_SHIPPING_THRESHOLD: i64 = 50_000;
/// Flat fee below the threshold.
pub const FLAT_SHIPPING_FEE: i64 = 3_000;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct Quote {
    pub subtotal: i64,
    pub shipping_fee: i64,
    pub total: i64,
}

/// Derives the quote from `(unit_price, quantity)` pairs. Deterministic and
/// free of side effects.
pub fn quote(lines: impl IntoIterator<Item = (i64, u32)>) -> Quote {
    let subtotal: i64 = lines
        .into_iter()
        .map(|(unit_price, qty)| unit_price * i64::from(qty))
        .sum();

    let shipping_fee = if subtotal >= FREE_SHIPPING_THRESHOLD {
        0
    } else {
        FLAT_SHIPPING_FEE
    };

    Quote {
        subtotal,
        shipping_fee,
        total: subtotal + shipping_fee,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_fee_below_threshold() {
        let q = quote([(12_000, 1)]);
        assert_eq!(q.subtotal, 12_000);
        assert_eq!(q.shipping_fee, FLAT_SHIPPING_FEE);
        assert_eq!(q.total, 15_000);
    }

    #[test]
    fn test_free_shipping_at_threshold_exactly() {
        let q = quote([(25_000, 2)]);
        assert_eq!(q.subtotal, 50_000);
        assert_eq!(q.shipping_fee, 0);
        assert_eq!(q.total, 50_000);
    }

    #[test]
    fn test_free_shipping_above_threshold() {
        let q = quote([(30_000, 2), (5_000, 1)]);
        assert_eq!(q.subtotal, 65_000);
        assert_eq!(q.shipping_fee, 0);
        assert_eq!(q.total, 65_000);
    }

    #[test]
    fn test_empty_cart_quote() {
        let q = quote([]);
        assert_eq!(q.subtotal, 0);
        assert_eq!(q.shipping_fee, FLAT_SHIPPING_FEE);
    }

    #[test]
    fn test_quantity_multiplies_unit_price() {
        let q = quote([(4_500, 3)]);
        assert_eq!(q.subtotal, 13_500);
        assert_eq!(q.total, 16_500);
    }
}
