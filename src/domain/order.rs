use crate::error::{Result, ShopError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "preparing" => Ok(OrderStatus::Preparing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ShopError::Validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The legal transition table. Anything not listed here is rejected with
    /// `InvalidTransition`, whoever asks.
    fn allows(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Pending, Paid)
                | (Pending, Cancelled)
                | (Paid, Cancelled)
                | (Paid, Preparing)
                | (Preparing, Shipped)
                | (Shipped, Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is asking for a status change. `System` is reserved for the payment
/// service; customers and admins come in through the public surfaces.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Actor {
    System,
    Customer(u32),
    Admin,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Redirect,
    Widget,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "redirect" => Ok(PaymentMethod::Redirect),
            "widget" => Ok(PaymentMethod::Widget),
            other => Err(ShopError::Validation(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Recipient {
    pub name: String,
    pub phone: String,
    pub zipcode: String,
    pub address: String,
    pub address_detail: Option<String>,
}

impl Recipient {
    /// Shipping data is mandatory at checkout.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty()
            || self.phone.trim().is_empty()
            || self.address.trim().is_empty()
        {
            return Err(ShopError::Validation(
                "recipient name, phone and address are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Durable order record. Line items are frozen at creation; only status and
/// payment metadata change afterwards, and only through [`Order::transition`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: u32,
    pub user_id: u32,
    /// Externally shown, provider-facing reference. Distinct from `id`.
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub shipping_fee: i64,
    pub recipient: Recipient,
    pub memo: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_key: Option<String>,
    /// Whether the capture went through a sandbox/test channel.
    #[serde(default)]
    pub payment_test_mode: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_cancellable(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Paid)
    }

    /// The single authority over `status`.
    ///
    /// Authorization is checked before table legality, so a customer poking
    /// at a fulfillment status always sees `Forbidden` rather than learning
    /// which transitions would have been legal.
    pub fn transition(&mut self, to: OrderStatus, actor: Actor) -> Result<()> {
        use OrderStatus::*;

        match to {
            Paid => {
                if actor != Actor::System {
                    return Err(ShopError::Forbidden);
                }
            }
            Cancelled => match actor {
                Actor::Admin | Actor::System => {}
                Actor::Customer(user_id) if user_id == self.user_id => {}
                Actor::Customer(_) => return Err(ShopError::Forbidden),
            },
            Preparing | Shipped | Delivered => {
                if actor != Actor::Admin {
                    return Err(ShopError::Forbidden);
                }
            }
            Pending => {
                return Err(ShopError::InvalidTransition {
                    from: self.status,
                    to,
                });
            }
        }

        if !self.status.allows(to) {
            return Err(ShopError::InvalidTransition {
                from: self.status,
                to,
            });
        }

        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Frozen copy of a product line at order-creation time. Later catalog price
/// changes must not show through.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct OrderItem {
    pub id: u64,
    pub order_id: u32,
    pub product_id: u32,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

/// Generates an order number: `SO` + yymmdd + 6 random uppercase hex chars.
/// Providers get this reference, never the internal id.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let date = now.format("%y%m%d");
    let suffix: String = uuid::Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("SO{date}{suffix}")
}
