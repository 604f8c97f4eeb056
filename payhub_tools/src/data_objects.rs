use serde::{Deserialize, Serialize};

/// A short-lived bearer token for the PayHub API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// The gateway's response to opening a payment. The shopper must be redirected to `redirect_url`
/// to complete the charge; `external_id` is PayHub's correlation id for the payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenedPayment {
    #[serde(rename = "id")]
    pub external_id: String,
    pub redirect_url: String,
    pub status: String,
}

/// The gateway's response to executing a previously-opened payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedPayment {
    #[serde(rename = "id")]
    pub external_id: String,
    /// The gateway-side transaction id. Only present when the charge went through.
    pub transaction_id: Option<String>,
    /// Raw gateway status string, e.g. "Completed", "Declined", "Voided".
    pub status: String,
}

impl ExecutedPayment {
    /// Only a gateway-side "Completed" verdict counts as a confirmed charge. Redirect hints
    /// are forgeable; this field is not.
    pub fn is_confirmed(&self) -> bool {
        self.status.eq_ignore_ascii_case("completed")
    }
}
