use gsp_common::Money;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Could not authenticate with the payment gateway: {0}")]
    Authentication(String),
    #[error("Network error talking to the payment gateway: {0}")]
    Network(String),
    #[error("The payment gateway returned a response we could not interpret: {0}")]
    InvalidResponse(String),
}

/// A payment session opened at the provider. The customer must be sent to `redirect_url` to
/// complete the charge.
#[derive(Debug, Clone)]
pub struct GatewayPayment {
    /// The provider's identifier for this payment session.
    pub external_id: String,
    /// Where the customer's browser goes to enter payment details.
    pub redirect_url: String,
}

/// The provider's answer when asked to execute a payment after the customer returns.
#[derive(Debug, Clone)]
pub struct GatewayConfirmation {
    /// True only when the provider reports the charge as definitively captured.
    pub confirmed: bool,
    /// The provider's transaction reference, when one was issued.
    pub transaction_id: Option<String>,
    /// The provider's status string, verbatim, for audit trails.
    pub raw_status: String,
}

/// Abstraction over the external payment provider.
///
/// Implementations must be cheap to clone. A network failure is reported as
/// [`GatewayError::Network`] and must never be conflated with a declined payment, since the
/// dispatcher treats the former as retryable and the latter as terminal.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    /// Opens a payment session for `amount` in `currency`, tagged with our `correlation_id` so
    /// the provider's records can be matched back to the intent.
    async fn open_payment(
        &self,
        amount: Money,
        currency: &str,
        correlation_id: &str,
    ) -> Result<GatewayPayment, GatewayError>;

    /// Asks the provider to execute the payment session identified by `external_id`.
    ///
    /// Returns `Ok` with `confirmed == false` when the provider answered but the charge did not
    /// capture. Returns `Err` only when we could not get a usable answer at all.
    async fn confirm_payment(&self, external_id: &str) -> Result<GatewayConfirmation, GatewayError>;
}
