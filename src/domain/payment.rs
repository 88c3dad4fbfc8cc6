use crate::domain::order::OrderItem;
use serde::Serialize;

/// Normalized output of a gateway `prepare` call. Sessions are derived from
/// stored order fields only, so preparing twice yields the same session and
/// never opens a second payable charge.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PaymentSession {
    /// Redirect-settlement style: the customer is sent to `payment_url`.
    /// Sandbox sessions carry no URL and set `test_mode` instead.
    Redirect {
        order_number: String,
        amount: i64,
        payment_url: Option<String>,
        test_mode: bool,
    },
    /// Widget-confirmation style: the fields required to open the provider's
    /// client-side widget.
    Widget {
        amount: i64,
        provider_order_ref: String,
        order_name: String,
        customer_name: String,
        customer_email: String,
    },
}

/// What a gateway reports back after settling a payment.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct SettlementReceipt {
    /// Provider-side key identifying the captured payment.
    pub payment_key: String,
    /// Amount the provider actually captured. Verified against the order's
    /// stored total before the order is marked paid.
    pub amount: i64,
    pub test_mode: bool,
}

/// Display name for a multi-line order, shown in provider UIs:
/// the first item's name, suffixed with the number of further lines.
pub fn order_display_name(items: &[OrderItem]) -> String {
    match items {
        [] => String::new(),
        [only] => only.product_name.clone(),
        [first, rest @ ..] => format!("{} and {} more", first.product_name, rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> OrderItem {
        OrderItem {
            id: 1,
            order_id: 1,
            product_id: 1,
            product_name: name.to_string(),
            unit_price: 10_000,
            quantity: 1,
        }
    }

    #[test]
    fn test_order_display_name() {
        assert_eq!(order_display_name(&[]), "");
        assert_eq!(order_display_name(&[item("Monstera")]), "Monstera");
        assert_eq!(
            order_display_name(&[item("Monstera"), item("Ficus"), item("Hoya")]),
            "Monstera and 2 more"
        );
    }
}
