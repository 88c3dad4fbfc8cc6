use super::{transport_error, PROVIDER_TIMEOUT_SECS};
use crate::domain::order::{Order, OrderItem, PaymentMethod};
use crate::domain::payment::{order_display_name, PaymentSession, SettlementReceipt};
use crate::domain::ports::PaymentGateway;
use crate::domain::user::User;
use crate::error::{Result, ShopError};
use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub secret_key: String,
    pub base_url: String,
}

impl WidgetConfig {
    pub fn from_env() -> Option<Self> {
        let secret_key = env::var("WIDGET_PAY_SECRET_KEY").ok()?;
        if secret_key.is_empty() {
            return None;
        }
        Some(Self {
            secret_key,
            base_url: env::var("WIDGET_PAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.widgetpay.example.com".to_string()),
        })
    }
}

/// Live adapter for the widget-confirmation provider. `prepare` is local:
/// it only assembles the fields the client-side widget needs. The charge is
/// created when the widget runs, and `settle` confirms it server-side.
pub struct WidgetGateway {
    config: WidgetConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ConfirmResponse {
    status: String,
    #[serde(default)]
    message: String,
}

impl WidgetGateway {
    pub fn new(config: WidgetConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .map_err(|e| ShopError::Internal(Box::new(e)))?;
        Ok(Self { config, http })
    }

    /// The provider expects `Basic base64(secret_key + ":")`.
    fn auth_header(&self) -> String {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{}:", self.config.secret_key));
        format!("Basic {encoded}")
    }
}

#[async_trait]
impl PaymentGateway for WidgetGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Widget
    }

    async fn prepare(
        &self,
        order: &Order,
        items: &[OrderItem],
        customer: &User,
    ) -> Result<PaymentSession> {
        Ok(PaymentSession::Widget {
            amount: order.total_amount,
            provider_order_ref: order.order_number.clone(),
            order_name: order_display_name(items),
            customer_name: order.recipient.name.clone(),
            customer_email: customer.email.clone(),
        })
    }

    async fn settle(&self, order: &Order, payment_ref: &str) -> Result<SettlementReceipt> {
        let url = format!("{}/v1/payments/confirm", self.config.base_url);
        let body = json!({
            "paymentKey": payment_ref,
            "orderId": order.order_number,
            "amount": order.total_amount,
        });

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err: ConfirmResponse = response.json().await.unwrap_or(ConfirmResponse {
                status: "REJECTED".to_string(),
                message: "confirmation rejected".to_string(),
            });
            return Err(ShopError::ProviderDeclined(err.message));
        }

        let confirmed: ConfirmResponse = response.json().await.map_err(transport_error)?;
        if confirmed.status != "DONE" {
            return Err(ShopError::ProviderDeclined(format!(
                "unexpected settlement status: {}",
                confirmed.status
            )));
        }

        Ok(SettlementReceipt {
            payment_key: payment_ref.to_string(),
            amount: order.total_amount,
            test_mode: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_header_encoding() {
        let gateway = WidgetGateway::new(WidgetConfig {
            secret_key: "test_sk_abc".to_string(),
            base_url: "https://api.widgetpay.example.com".to_string(),
        })
        .unwrap();

        // base64("test_sk_abc:")
        assert_eq!(gateway.auth_header(), "Basic dGVzdF9za19hYmM6");
    }
}
