use crate::domain::order::{Order, OrderItem, PaymentMethod};
use crate::domain::payment::{order_display_name, PaymentSession, SettlementReceipt};
use crate::domain::ports::PaymentGateway;
use crate::domain::user::User;
use crate::error::{Result, ShopError};
use async_trait::async_trait;

/// What the sandbox should do when asked to settle.
#[derive(Debug, Clone)]
pub enum SandboxOutcome {
    Approve,
    Decline(String),
    Unreachable(String),
}

/// In-process gateway implementing the same contract as the live providers.
/// Selected when no provider credentials are configured, and injected by
/// tests to script provider behavior instead of branching inside production
/// logic.
pub struct SandboxGateway {
    method: PaymentMethod,
    outcome: SandboxOutcome,
    /// Lets tests simulate a provider capturing the wrong amount.
    settled_amount_override: Option<i64>,
}

impl SandboxGateway {
    pub fn approving(method: PaymentMethod) -> Self {
        Self {
            method,
            outcome: SandboxOutcome::Approve,
            settled_amount_override: None,
        }
    }

    pub fn with_outcome(method: PaymentMethod, outcome: SandboxOutcome) -> Self {
        Self {
            method,
            outcome,
            settled_amount_override: None,
        }
    }

    pub fn settling_amount(mut self, amount: i64) -> Self {
        self.settled_amount_override = Some(amount);
        self
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    fn method(&self) -> PaymentMethod {
        self.method
    }

    async fn prepare(
        &self,
        order: &Order,
        items: &[OrderItem],
        customer: &User,
    ) -> Result<PaymentSession> {
        Ok(match self.method {
            PaymentMethod::Redirect => PaymentSession::Redirect {
                order_number: order.order_number.clone(),
                amount: order.total_amount,
                payment_url: None,
                test_mode: true,
            },
            PaymentMethod::Widget => PaymentSession::Widget {
                amount: order.total_amount,
                provider_order_ref: order.order_number.clone(),
                order_name: order_display_name(items),
                customer_name: order.recipient.name.clone(),
                customer_email: customer.email.clone(),
            },
        })
    }

    async fn settle(&self, order: &Order, payment_ref: &str) -> Result<SettlementReceipt> {
        match &self.outcome {
            SandboxOutcome::Approve => Ok(SettlementReceipt {
                payment_key: if payment_ref.is_empty() {
                    format!("sandbox_{}", order.order_number)
                } else {
                    payment_ref.to_string()
                },
                amount: self.settled_amount_override.unwrap_or(order.total_amount),
                test_mode: true,
            }),
            SandboxOutcome::Decline(reason) => Err(ShopError::ProviderDeclined(reason.clone())),
            SandboxOutcome::Unreachable(reason) => {
                Err(ShopError::ProviderUnreachable(reason.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderStatus, Recipient};
    use crate::domain::user::Role;
    use chrono::Utc;

    fn fixture() -> (Order, Vec<OrderItem>, User) {
        let now = Utc::now();
        let order = Order {
            id: 1,
            user_id: 7,
            order_number: "SO250101ABCDEF".to_string(),
            status: OrderStatus::Pending,
            total_amount: 15_000,
            shipping_fee: 3_000,
            recipient: Recipient {
                name: "Kim".to_string(),
                phone: "010-0000-0000".to_string(),
                zipcode: "04524".to_string(),
                address: "Seoul".to_string(),
                address_detail: None,
            },
            memo: None,
            payment_method: PaymentMethod::Widget,
            payment_key: None,
            payment_test_mode: false,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        let items = vec![OrderItem {
            id: 1,
            order_id: 1,
            product_id: 1,
            product_name: "Monstera".to_string(),
            unit_price: 12_000,
            quantity: 1,
        }];
        let user = User::new(7, "kim@shop.test", "Kim", Role::Customer);
        (order, items, user)
    }

    #[tokio::test]
    async fn test_widget_session_fields() {
        let (order, items, user) = fixture();
        let gateway = SandboxGateway::approving(PaymentMethod::Widget);

        let session = gateway.prepare(&order, &items, &user).await.unwrap();
        assert_eq!(
            session,
            PaymentSession::Widget {
                amount: 15_000,
                provider_order_ref: "SO250101ABCDEF".to_string(),
                order_name: "Monstera".to_string(),
                customer_name: "Kim".to_string(),
                customer_email: "kim@shop.test".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_redirect_session_is_test_mode() {
        let (order, items, user) = fixture();
        let gateway = SandboxGateway::approving(PaymentMethod::Redirect);

        match gateway.prepare(&order, &items, &user).await.unwrap() {
            PaymentSession::Redirect {
                payment_url,
                test_mode,
                amount,
                ..
            } => {
                assert!(payment_url.is_none());
                assert!(test_mode);
                assert_eq!(amount, 15_000);
            }
            other => panic!("unexpected session: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_scripted_outcomes() {
        let (order, _, _) = fixture();

        let declined = SandboxGateway::with_outcome(
            PaymentMethod::Widget,
            SandboxOutcome::Decline("card limit".to_string()),
        );
        assert!(matches!(
            declined.settle(&order, "key").await,
            Err(ShopError::ProviderDeclined(_))
        ));

        let down = SandboxGateway::with_outcome(
            PaymentMethod::Redirect,
            SandboxOutcome::Unreachable("timeout".to_string()),
        );
        assert!(matches!(
            down.settle(&order, "key").await,
            Err(ShopError::ProviderUnreachable(_))
        ));
    }
}
