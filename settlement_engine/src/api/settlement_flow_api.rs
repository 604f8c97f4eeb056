use gsp_common::{Money, Secret, DEFAULT_CURRENCY_CODE};
use log::{debug, info, warn};

use crate::{
    api::SettlementApiError,
    db_types::{IntentStatus, NewPaymentIntent, OutcomeHint, PaymentIntent, RedeemReceipt},
    helpers::{hash_password, new_correlation_id},
    payloads::{IntentPayload, OrderPayload, RegistrationPayload, TopUpPayload},
    redirects::{destination, Disposition},
    traits::{PaymentGateway, SettlementDatabase, SettlementError},
};

/// A successfully initialized checkout. The caller sends the customer to `redirect_url`; the
/// correlation id comes back to us on the callback.
#[derive(Debug, Clone)]
pub struct InitializedCheckout {
    pub correlation_id: String,
    pub redirect_url: String,
    pub intent: PaymentIntent,
}

/// Where to send the customer after a callback has been settled.
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub intent: PaymentIntent,
    pub redirect: String,
}

/// A reseller onboarding application, as submitted. The password is hashed before anything is
/// persisted or sent anywhere.
#[derive(Debug, Clone)]
pub struct OnboardingRequest {
    pub email: String,
    pub name: String,
    pub business_name: String,
    pub password: Secret<String>,
    pub onboarding_fee: Money,
}

/// The `SettlementApi` is the main entry point for the settlement engine's write path.
///
/// It ties a [`SettlementDatabase`] backend to a [`PaymentGateway`] and implements the
/// initialize / callback / redeem flows on top of them. The API itself is stateless; all state
/// lives in the database, keyed by the intent's correlation id.
#[derive(Debug, Clone)]
pub struct SettlementApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> SettlementApi<B, G>
where
    B: SettlementDatabase,
    G: PaymentGateway,
{
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Initializes a checkout for the given payload.
    ///
    /// The payload is validated first; an invalid payload never reaches the gateway. The payment
    /// is then opened at the gateway, and only once the gateway has answered is the intent
    /// persisted, already carrying the gateway's external id. A gateway failure here leaves no
    /// intent behind.
    pub async fn initialize(
        &self,
        user_id: &str,
        payload: IntentPayload,
    ) -> Result<InitializedCheckout, SettlementApiError> {
        payload.validate()?;
        let amount = payload.charge_amount();
        let correlation_id = new_correlation_id();
        let opened = self.gateway.open_payment(amount, DEFAULT_CURRENCY_CODE, &correlation_id).await?;
        let intent = self
            .db
            .insert_intent(NewPaymentIntent {
                correlation_id: correlation_id.clone(),
                external_id: opened.external_id,
                user_id: user_id.to_string(),
                amount,
                currency: DEFAULT_CURRENCY_CODE.to_string(),
                purpose: payload.purpose(),
                payload: serde_json::to_string(&payload)?,
            })
            .await?;
        info!("🛒️ Checkout [{correlation_id}] initialized for user [{user_id}]: {amount} ({})", intent.purpose);
        Ok(InitializedCheckout { correlation_id, redirect_url: opened.redirect_url, intent })
    }

    /// Begins an order checkout from the customer's stored cart.
    ///
    /// The cart is snapshotted into the intent payload; later cart edits cannot affect this
    /// checkout. The cart itself is only deleted when the order is fulfilled.
    pub async fn begin_checkout(&self, customer_id: &str) -> Result<InitializedCheckout, SettlementApiError> {
        let cart = self
            .db
            .fetch_cart(customer_id)
            .await?
            .ok_or_else(|| SettlementApiError::EmptyCart(customer_id.to_string()))?;
        let snapshot = cart.snapshot()?;
        self.initialize(customer_id, IntentPayload::Order(OrderPayload { cart: snapshot })).await
    }

    /// Begins a wallet top-up checkout for the given amount.
    pub async fn begin_topup(&self, user_id: &str, amount: Money) -> Result<InitializedCheckout, SettlementApiError> {
        self.initialize(user_id, IntentPayload::WalletTopup(TopUpPayload { amount })).await
    }

    /// Begins a reseller onboarding checkout. The application's password is hashed here, so the
    /// persisted intent never carries the plaintext.
    pub async fn begin_onboarding(
        &self,
        user_id: &str,
        request: OnboardingRequest,
    ) -> Result<InitializedCheckout, SettlementApiError> {
        let password_hash = hash_password(request.password.reveal())?;
        let payload = IntentPayload::ResellerOnboarding(RegistrationPayload {
            email: request.email,
            name: request.name,
            business_name: request.business_name,
            password_hash,
            onboarding_fee: request.onboarding_fee,
        });
        self.initialize(user_id, payload).await
    }

    /// Settles a gateway callback for the given correlation id.
    ///
    /// This method is idempotent: callbacks for an already-finalized intent return the stored
    /// outcome without touching the gateway or the database again. For a success hint the charge
    /// is re-confirmed against the gateway before anything durable happens; the hint alone is
    /// never trusted. A gateway error during confirmation propagates and leaves the intent
    /// `Pending`, so a retried callback can settle it later.
    pub async fn handle_callback(
        &self,
        correlation_id: &str,
        hint: OutcomeHint,
    ) -> Result<CallbackOutcome, SettlementApiError> {
        let intent = self.db.fetch_intent(correlation_id).await?;
        if intent.status.is_terminal() {
            debug!("🔁️ Callback replay for finalized intent [{correlation_id}] ({})", intent.status);
            return Ok(outcome_for(intent));
        }
        match hint {
            OutcomeHint::Success => self.settle_success(intent).await,
            OutcomeHint::Failure => {
                self.settle_terminal(intent, IntentStatus::Failed, Some("Payment failed")).await
            },
            OutcomeHint::Cancel => {
                self.settle_terminal(intent, IntentStatus::Cancelled, Some("Payment cancelled by customer")).await
            },
        }
    }

    /// Redeems a prepaid code into the user's wallet.
    pub async fn redeem(&self, code: &str, user_id: &str) -> Result<RedeemReceipt, SettlementApiError> {
        let receipt = self.db.redeem_code(code, user_id).await?;
        info!("🎟️ User [{user_id}] redeemed {} into account {}", receipt.credited, receipt.account_id);
        Ok(receipt)
    }

    async fn settle_success(&self, intent: PaymentIntent) -> Result<CallbackOutcome, SettlementApiError> {
        let external_id = intent.external_id.clone().ok_or_else(|| {
            SettlementError::InvalidPayload(format!("Intent {} has no gateway payment id", intent.correlation_id))
        })?;
        // A network or auth failure here propagates without finalizing; the intent stays Pending
        // and the gateway's retried webhook gets another chance.
        let confirmation = self.gateway.confirm_payment(&external_id).await?;
        if !confirmation.confirmed {
            warn!(
                "❌️ Gateway reported unconfirmed status '{}' for intent [{}]",
                confirmation.raw_status, intent.correlation_id
            );
            let reason = format!("Gateway reported status '{}'", confirmation.raw_status);
            return self.settle_terminal(intent, IntentStatus::Failed, Some(&reason)).await;
        }
        let transaction_id = confirmation.transaction_id.unwrap_or_else(|| external_id.clone());
        match self.db.fulfill_intent(&intent, &transaction_id).await {
            Ok(updated) => Ok(outcome_for(updated)),
            Err(SettlementError::IntentAlreadyFinalized(_)) => {
                // Lost the race to a concurrent dispatcher. The winner's result is durable, so
                // report that instead of an error.
                debug!("🔁️ Concurrent callback already finalized intent [{}]", intent.correlation_id);
                let winner = self.db.fetch_intent(&intent.correlation_id).await?;
                Ok(outcome_for(winner))
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn settle_terminal(
        &self,
        intent: PaymentIntent,
        status: IntentStatus,
        reason: Option<&str>,
    ) -> Result<CallbackOutcome, SettlementApiError> {
        match self.db.finalize_intent(&intent.correlation_id, status, reason).await {
            Ok(updated) => {
                info!("🏁️ Intent [{}] finalized as {status}", intent.correlation_id);
                Ok(outcome_for(updated))
            },
            Err(SettlementError::IntentAlreadyFinalized(_)) => {
                let winner = self.db.fetch_intent(&intent.correlation_id).await?;
                Ok(outcome_for(winner))
            },
            Err(e) => Err(e.into()),
        }
    }
}

fn outcome_for(intent: PaymentIntent) -> CallbackOutcome {
    let redirect = destination(intent.purpose, Disposition::from(intent.status), intent.result_id);
    CallbackOutcome { intent, redirect }
}
