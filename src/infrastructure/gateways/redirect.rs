use super::{transport_error, PROVIDER_TIMEOUT_SECS};
use crate::domain::order::{Order, OrderItem, PaymentMethod};
use crate::domain::payment::{order_display_name, PaymentSession, SettlementReceipt};
use crate::domain::ports::PaymentGateway;
use crate::domain::user::User;
use crate::error::{Result, ShopError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::time::Duration;

/// Credentials and endpoints for the redirect-settlement provider.
#[derive(Debug, Clone)]
pub struct RedirectConfig {
    pub client_id: String,
    pub client_secret: String,
    pub chain_id: String,
    pub base_url: String,
    /// Where the provider sends the customer back after settlement.
    pub return_url: String,
}

impl RedirectConfig {
    /// Reads credentials from the environment; `None` when unset, in which
    /// case the caller wires the sandbox gateway instead.
    pub fn from_env() -> Option<Self> {
        let client_id = env::var("REDIRECT_PAY_CLIENT_ID").ok()?;
        if client_id.is_empty() {
            return None;
        }
        Some(Self {
            client_id,
            client_secret: env::var("REDIRECT_PAY_CLIENT_SECRET").unwrap_or_default(),
            chain_id: env::var("REDIRECT_PAY_CHAIN_ID").unwrap_or_default(),
            base_url: env::var("REDIRECT_PAY_BASE_URL")
                .unwrap_or_else(|_| "https://apis.pay.example.com".to_string()),
            return_url: env::var("REDIRECT_PAY_RETURN_URL").unwrap_or_default(),
        })
    }
}

/// Live adapter for the redirect-settlement provider: `prepare` reserves a
/// payment and yields the URL to send the customer to; `settle` applies the
/// approval after the customer returns.
pub struct RedirectGateway {
    config: RedirectConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ReserveResponse {
    payment_url: String,
}

#[derive(Deserialize)]
struct ApplyResponse {
    payment_id: String,
    total_pay_amount: i64,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl RedirectGateway {
    pub fn new(config: RedirectConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .map_err(|e| ShopError::Internal(Box::new(e)))?;
        Ok(Self { config, http })
    }

    fn auth_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("X-Client-Id", &self.config.client_id)
            .header("X-Client-Secret", &self.config.client_secret)
            .header("X-Chain-Id", &self.config.chain_id)
    }
}

#[async_trait]
impl PaymentGateway for RedirectGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Redirect
    }

    async fn prepare(
        &self,
        order: &Order,
        items: &[OrderItem],
        _customer: &User,
    ) -> Result<PaymentSession> {
        let url = format!("{}/v1/payments/reserve", self.config.base_url);
        let body = json!({
            "merchantPayKey": order.order_number,
            "totalPayAmount": order.total_amount,
            "productName": order_display_name(items),
            "returnUrl": self.config.return_url,
        });

        let response = self
            .auth_headers(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err: ErrorBody = response.json().await.unwrap_or(ErrorBody {
                message: "reserve rejected".to_string(),
            });
            return Err(ShopError::ProviderDeclined(err.message));
        }

        let reserved: ReserveResponse = response.json().await.map_err(transport_error)?;
        Ok(PaymentSession::Redirect {
            order_number: order.order_number.clone(),
            amount: order.total_amount,
            payment_url: Some(reserved.payment_url),
            test_mode: false,
        })
    }

    async fn settle(&self, order: &Order, payment_ref: &str) -> Result<SettlementReceipt> {
        let url = format!(
            "{}/v1/payments/{}/apply",
            self.config.base_url, payment_ref
        );
        let body = json!({
            "merchantPayKey": order.order_number,
        });

        let response = self
            .auth_headers(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err: ErrorBody = response.json().await.unwrap_or(ErrorBody {
                message: "approval rejected".to_string(),
            });
            return Err(ShopError::ProviderDeclined(err.message));
        }

        let applied: ApplyResponse = response.json().await.map_err(transport_error)?;
        Ok(SettlementReceipt {
            payment_key: applied.payment_id,
            amount: applied.total_pay_amount,
            test_mode: false,
        })
    }
}
