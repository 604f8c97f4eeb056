use thiserror::Error;

use crate::{
    db_types::{Cart, IntentStatus, NewPaymentIntent, PaymentIntent, RedeemReceipt},
    traits::{AccountApiError, AccountManagement},
};

/// This trait defines the highest level of behaviour for backends supporting the settlement
/// engine.
///
/// This behaviour includes:
/// * Recording new payment intents as checkouts are initialized.
/// * Driving intents through their single Pending -> terminal transition.
/// * Running purpose-specific fulfillment atomically with that transition.
/// * Cart storage for the checkout flow.
#[allow(async_fn_in_trait)]
pub trait SettlementDatabase: Clone + AccountManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new payment intent. The correlation id must be fresh.
    /// Returns the inserted intent record with its assigned row id.
    async fn insert_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, SettlementError>;

    /// Fetches the intent with the given correlation id, or [`SettlementError::IntentNotFound`].
    async fn fetch_intent(&self, correlation_id: &str) -> Result<PaymentIntent, SettlementError>;

    /// Takes a confirmed intent, and in a single atomic transaction,
    /// * runs the fulfillment handler for the intent's purpose (creating the order, crediting the
    ///   wallet, or provisioning the reseller),
    /// * marks the intent `Completed`, recording `transaction_id` and the handler's result id.
    ///
    /// The intent must currently be `Pending`. If another dispatcher finalized it first, the
    /// transaction rolls back and [`SettlementError::IntentAlreadyFinalized`] is returned; the
    /// caller should re-fetch the intent and use the stored result. If the handler itself fails,
    /// the transaction rolls back and the intent stays `Pending`.
    ///
    /// Returns the updated intent record.
    async fn fulfill_intent(
        &self,
        intent: &PaymentIntent,
        transaction_id: &str,
    ) -> Result<PaymentIntent, SettlementError>;

    /// Moves a `Pending` intent to the given terminal status without running any fulfillment.
    /// Used for declined and cancelled payments.
    ///
    /// Returns [`SettlementError::IntentAlreadyFinalized`] if the intent is no longer `Pending`.
    async fn finalize_intent(
        &self,
        correlation_id: &str,
        status: IntentStatus,
        failure_reason: Option<&str>,
    ) -> Result<PaymentIntent, SettlementError>;

    /// Redeems a prepaid code for `user_id`, crediting its face value to their wallet.
    ///
    /// In a single atomic transaction the code is marked `Used` and a ledger credit is written.
    /// A code past its expiry date is marked `Expired` instead and the redemption is refused.
    async fn redeem_code(&self, code: &str, user_id: &str) -> Result<RedeemReceipt, SettlementError>;

    /// Fetches the stored cart for the customer, if any.
    async fn fetch_cart(&self, customer_id: &str) -> Result<Option<Cart>, SettlementError>;

    /// Replaces the customer's cart with the given line items (JSON snapshot).
    async fn save_cart(&self, customer_id: &str, items: &serde_json::Value) -> Result<Cart, SettlementError>;

    /// Deletes the customer's cart. A no-op if no cart exists.
    async fn clear_cart(&self, customer_id: &str) -> Result<(), SettlementError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), SettlementError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("Cannot insert intent, since correlation id {0} already exists")]
    IntentAlreadyExists(String),
    #[error("The intent with correlation id {0} does not exist")]
    IntentNotFound(String),
    #[error("The intent with correlation id {0} has already been finalized")]
    IntentAlreadyFinalized(String),
    #[error("The intent payload could not be interpreted: {0}")]
    InvalidPayload(String),
    #[error("Fulfillment failed: {0}")]
    FulfillmentError(String),
    #[error("A reseller with email {0} is already registered")]
    ResellerAlreadyExists(String),
    #[error("Could not find a free subdomain for store '{0}'")]
    SubdomainExhausted(String),
    #[error("The redeem code {0} does not exist")]
    CodeNotFound(String),
    #[error("The redeem code {0} cannot be redeemed: {1}")]
    CodeNotRedeemable(String, String),
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
}

impl From<sqlx::Error> for SettlementError {
    fn from(e: sqlx::Error) -> Self {
        SettlementError::DatabaseError(e.to_string())
    }
}
