//! Payment gateway adapters. Two live HTTP providers (redirect-settlement
//! and widget-confirmation) plus an injectable sandbox used when no
//! credentials are configured and throughout the tests. Amount and state
//! invariants are NOT enforced here; the payment service owns those.

pub mod redirect;
pub mod sandbox;
pub mod widget;

use crate::error::ShopError;

/// Every live call has a timeout; hanging on a provider is never an option.
pub(crate) const PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Transport-level failures are retryable by the customer, so they map to
/// `ProviderUnreachable` rather than anything terminal.
pub(crate) fn transport_error(err: reqwest::Error) -> ShopError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        ShopError::ProviderUnreachable(err.to_string())
    } else {
        ShopError::Internal(Box::new(err))
    }
}
