use gsp_common::Money;
use serde::{Deserialize, Serialize};
use settlement_engine::{db_types::RedeemReceipt, payloads::CartSnapshot};

#[derive(Debug, Clone, Deserialize)]
pub struct CartUpdateRequest {
    pub lines: CartSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopUpRequest {
    pub amount: Money,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingParams {
    pub email: String,
    pub name: String,
    pub business_name: String,
    pub password: String,
    pub onboarding_fee: Money,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedeemRequest {
    pub code: String,
}

/// What a checkout initializer hands back: the handle for the callback, and where to send the
/// customer to pay.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub correlation_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    /// The gateway's claim about the outcome. A hint only; success is re-verified server side.
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedeemResponse {
    pub credited: String,
    pub new_balance: String,
}

impl From<RedeemReceipt> for RedeemResponse {
    fn from(receipt: RedeemReceipt) -> Self {
        Self { credited: receipt.credited.to_string(), new_balance: receipt.new_balance.to_string() }
    }
}
