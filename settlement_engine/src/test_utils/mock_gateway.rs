use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
    Mutex,
};

use gsp_common::Money;

use crate::traits::{GatewayConfirmation, GatewayError, GatewayPayment, PaymentGateway};

/// What the mock should answer when asked to confirm a payment.
#[derive(Debug, Clone)]
pub enum ConfirmBehaviour {
    /// The charge captured. The transaction id is `txn-{external_id}`.
    Confirmed,
    /// The provider answered, but with the given non-captured status.
    Declined(String),
    /// The provider could not be reached.
    Error(GatewayError),
}

#[derive(Debug, Default)]
struct MockState {
    open_failure: Option<GatewayError>,
    confirm_behaviour: Option<ConfirmBehaviour>,
}

/// An in-memory, scriptable [`PaymentGateway`] for tests. Clones share state, so a test can keep
/// a handle for scripting while the API under test holds another.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
    opened: Arc<AtomicUsize>,
    confirmed: Arc<AtomicUsize>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next and all subsequent `open_payment` calls fail with the given error.
    pub fn fail_open(&self, error: GatewayError) {
        self.state.lock().unwrap().open_failure = Some(error);
    }

    /// Scripts the answer for subsequent `confirm_payment` calls. The default is `Confirmed`.
    pub fn script_confirm(&self, behaviour: ConfirmBehaviour) {
        self.state.lock().unwrap().confirm_behaviour = Some(behaviour);
    }

    pub fn open_calls(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn confirm_calls(&self) -> usize {
        self.confirmed.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for MockGateway {
    async fn open_payment(
        &self,
        _amount: Money,
        _currency: &str,
        correlation_id: &str,
    ) -> Result<GatewayPayment, GatewayError> {
        let n = self.opened.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.state.lock().unwrap().open_failure.clone() {
            return Err(e);
        }
        let external_id = format!("pay-{n}-{correlation_id}");
        Ok(GatewayPayment {
            redirect_url: format!("https://pay.example/session/{external_id}"),
            external_id,
        })
    }

    async fn confirm_payment(&self, external_id: &str) -> Result<GatewayConfirmation, GatewayError> {
        self.confirmed.fetch_add(1, Ordering::SeqCst);
        let behaviour =
            self.state.lock().unwrap().confirm_behaviour.clone().unwrap_or(ConfirmBehaviour::Confirmed);
        match behaviour {
            ConfirmBehaviour::Confirmed => Ok(GatewayConfirmation {
                confirmed: true,
                transaction_id: Some(format!("txn-{external_id}")),
                raw_status: "COMPLETED".to_string(),
            }),
            ConfirmBehaviour::Declined(raw_status) => {
                Ok(GatewayConfirmation { confirmed: false, transaction_id: None, raw_status })
            },
            ConfirmBehaviour::Error(e) => Err(e),
        }
    }
}
