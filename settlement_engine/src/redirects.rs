//! Redirect destinations for settled (or unsettlable) payments.
//!
//! The destination is a pure function of the intent's purpose and its final disposition. Callers
//! always receive a destination, never a raw error; ambiguous states route to the purpose's error
//! page.

use crate::db_types::{IntentStatus, Purpose};

/// How a callback ended, from the shopper's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Success,
    Failed,
    Cancelled,
    /// The outcome could not be established (gateway unreachable, handler error). The intent may
    /// still be pending and a later callback can settle it.
    Error,
}

impl From<IntentStatus> for Disposition {
    fn from(status: IntentStatus) -> Self {
        match status {
            IntentStatus::Completed => Disposition::Success,
            IntentStatus::Failed => Disposition::Failed,
            IntentStatus::Cancelled => Disposition::Cancelled,
            IntentStatus::Pending => Disposition::Error,
        }
    }
}

/// Returns the storefront path the shopper should be sent to. `result_id` is the id of the entity
/// fulfillment created (only meaningful on the success path of an order).
pub fn destination(purpose: Purpose, disposition: Disposition, result_id: Option<i64>) -> String {
    use Disposition::*;
    match (purpose, disposition) {
        (Purpose::Order, Success) => match result_id {
            Some(id) => format!("/store/orders/{id}?status=success"),
            None => "/store/orders?status=success".to_string(),
        },
        (Purpose::Order, Failed) => "/store/orders/failed".to_string(),
        (Purpose::Order, Cancelled) => "/store/orders/cancelled".to_string(),
        (Purpose::Order, Error) => "/store/orders/error".to_string(),
        (Purpose::WalletTopup, Success) => "/account/wallet?status=success".to_string(),
        (Purpose::WalletTopup, Failed) => "/account/wallet?status=failed".to_string(),
        (Purpose::WalletTopup, Cancelled) => "/account/wallet?status=cancelled".to_string(),
        (Purpose::WalletTopup, Error) => "/account/wallet?status=error".to_string(),
        (Purpose::ResellerOnboarding, Success) => "/resellers/onboarding/success".to_string(),
        (Purpose::ResellerOnboarding, Failed) => "/resellers/onboarding/failed".to_string(),
        (Purpose::ResellerOnboarding, Cancelled) => "/resellers/onboarding/cancelled".to_string(),
        (Purpose::ResellerOnboarding, Error) => "/resellers/onboarding/error".to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_success_includes_order_id() {
        assert_eq!(destination(Purpose::Order, Disposition::Success, Some(42)), "/store/orders/42?status=success");
    }

    #[test]
    fn wallet_destinations_carry_status_query() {
        assert_eq!(destination(Purpose::WalletTopup, Disposition::Cancelled, None), "/account/wallet?status=cancelled");
        assert_eq!(destination(Purpose::WalletTopup, Disposition::Failed, None), "/account/wallet?status=failed");
    }

    #[test]
    fn pending_maps_to_error_page() {
        let d = Disposition::from(IntentStatus::Pending);
        assert_eq!(destination(Purpose::ResellerOnboarding, d, None), "/resellers/onboarding/error");
    }
}
