//! Purpose-specific intent payloads.
//!
//! Each payment intent embeds a typed payload describing what the payment is for and everything a
//! fulfillment handler needs to apply it. The payload is snapshotted at initialization time, so a
//! cart that mutates mid-checkout cannot alter a paid order, and the dispatcher never re-reads
//! upstream state.

use gsp_common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::Purpose;

#[derive(Debug, Clone, Error)]
#[error("Invalid fulfillment request: {0}")]
pub struct PayloadValidationError(pub String);

//--------------------------------------   IntentPayload     ---------------------------------------------------------
/// The tagged union of everything a payment can be for. Dispatch on this enum is exhaustive, so a
/// new purpose cannot be added without a handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "purpose", rename_all = "snake_case")]
pub enum IntentPayload {
    Order(OrderPayload),
    WalletTopup(TopUpPayload),
    ResellerOnboarding(RegistrationPayload),
}

impl IntentPayload {
    pub fn purpose(&self) -> Purpose {
        match self {
            IntentPayload::Order(_) => Purpose::Order,
            IntentPayload::WalletTopup(_) => Purpose::WalletTopup,
            IntentPayload::ResellerOnboarding(_) => Purpose::ResellerOnboarding,
        }
    }

    /// The amount to charge for this payload. Only meaningful after [`Self::validate`] has passed.
    pub fn charge_amount(&self) -> Money {
        match self {
            IntentPayload::Order(p) => p.cart.total(),
            IntentPayload::WalletTopup(p) => p.amount,
            IntentPayload::ResellerOnboarding(p) => p.onboarding_fee,
        }
    }

    /// Purpose-specific completeness and amount checks. A payload that fails validation never
    /// reaches the gateway and no intent is persisted for it.
    pub fn validate(&self) -> Result<(), PayloadValidationError> {
        match self {
            IntentPayload::Order(p) => p.validate(),
            IntentPayload::WalletTopup(p) => p.validate(),
            IntentPayload::ResellerOnboarding(p) => p.validate(),
        }
    }
}

//--------------------------------------    OrderPayload     ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayload {
    /// Denormalized cart contents with prices captured at checkout time.
    pub cart: CartSnapshot,
}

impl OrderPayload {
    fn validate(&self) -> Result<(), PayloadValidationError> {
        if self.cart.lines.is_empty() {
            return Err(PayloadValidationError("cart is empty".into()));
        }
        for line in &self.cart.lines {
            if line.quantity == 0 {
                return Err(PayloadValidationError(format!("zero quantity for product {}", line.product_id)));
            }
            if !line.unit_price.is_positive() {
                return Err(PayloadValidationError(format!("non-positive price for product {}", line.product_id)));
            }
        }
        if !self.cart.total().is_positive() {
            return Err(PayloadValidationError("cart total must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
}

impl CartSnapshot {
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    /// Present when the product is a prepaid-code product; fulfillment mints one code per unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepaid_code: Option<PrepaidCodeSpec>,
}

impl CartLine {
    pub fn subtotal(&self) -> Money {
        self.unit_price * i64::from(self.quantity)
    }
}

/// Parameters for minting a redeem code when a prepaid-code product is purchased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaidCodeSpec {
    /// Face value credited on redemption.
    pub value: Money,
    pub validity_days: i64,
}

//--------------------------------------    TopUpPayload     ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopUpPayload {
    pub amount: Money,
}

impl TopUpPayload {
    fn validate(&self) -> Result<(), PayloadValidationError> {
        if !self.amount.is_positive() {
            return Err(PayloadValidationError("top-up amount must be positive".into()));
        }
        Ok(())
    }
}

//-------------------------------------- RegistrationPayload ---------------------------------------------------------
/// Pending reseller registration data. The password is hashed before it is embedded here, so the
/// intent record never carries a plaintext credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationPayload {
    pub email: String,
    pub name: String,
    pub business_name: String,
    pub password_hash: String,
    pub onboarding_fee: Money,
}

impl RegistrationPayload {
    fn validate(&self) -> Result<(), PayloadValidationError> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(PayloadValidationError("a valid email address is required".into()));
        }
        if self.name.trim().is_empty() {
            return Err(PayloadValidationError("name is required".into()));
        }
        if self.business_name.trim().is_empty() {
            return Err(PayloadValidationError("business name is required".into()));
        }
        if self.password_hash.is_empty() {
            return Err(PayloadValidationError("password is required".into()));
        }
        if !self.onboarding_fee.is_positive() {
            return Err(PayloadValidationError("onboarding fee must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn snapshot() -> CartSnapshot {
        CartSnapshot {
            lines: vec![
                CartLine {
                    product_id: "prod-1".into(),
                    title: "1000 gems".into(),
                    variant: Some("EU region".into()),
                    quantity: 2,
                    unit_price: Money::from_units(100),
                    prepaid_code: None,
                },
                CartLine {
                    product_id: "prod-2".into(),
                    title: "Gift card".into(),
                    variant: None,
                    quantity: 1,
                    unit_price: Money::from_units(50),
                    prepaid_code: Some(PrepaidCodeSpec { value: Money::from_units(50), validity_days: 365 }),
                },
            ],
        }
    }

    #[test]
    fn cart_total_sums_line_subtotals() {
        assert_eq!(snapshot().total(), Money::from_units(250));
    }

    #[test]
    fn payload_round_trips_through_json() {
        let payload = IntentPayload::Order(OrderPayload { cart: snapshot() });
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(r#""purpose":"order""#));
        let back: IntentPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.purpose(), Purpose::Order);
        assert_eq!(back.charge_amount(), Money::from_units(250));
    }

    #[test]
    fn empty_cart_is_rejected() {
        let payload = IntentPayload::Order(OrderPayload { cart: CartSnapshot { lines: vec![] } });
        assert!(payload.validate().is_err());
    }

    #[test]
    fn non_positive_topup_is_rejected() {
        let payload = IntentPayload::WalletTopup(TopUpPayload { amount: Money::from_cents(0) });
        assert!(payload.validate().is_err());
        let payload = IntentPayload::WalletTopup(TopUpPayload { amount: Money::from_cents(-100) });
        assert!(payload.validate().is_err());
    }

    #[test]
    fn registration_requires_contact_fields() {
        let mut reg = RegistrationPayload {
            email: "owner@example.com".into(),
            name: "Owner".into(),
            business_name: "Gem Palace".into(),
            password_hash: "$argon2id$...".into(),
            onboarding_fee: Money::from_units(500),
        };
        assert!(reg.validate().is_ok());
        reg.email = "not-an-email".into();
        assert!(reg.validate().is_err());
    }
}
