//! Bridges the PayHub REST client into the engine's [`PaymentGateway`] trait.
use gsp_common::Money;
use log::debug;
use payhub_tools::{PayHubApi, PayHubApiError, PayHubConfig};
use settlement_engine::traits::{GatewayConfirmation, GatewayError, GatewayPayment, PaymentGateway};

#[derive(Clone)]
pub struct PayHubGateway {
    api: PayHubApi,
}

impl PayHubGateway {
    pub fn try_new(config: PayHubConfig) -> Result<Self, GatewayError> {
        let api = PayHubApi::new(config).map_err(|e| GatewayError::Network(e.to_string()))?;
        Ok(Self { api })
    }
}

/// PayHub access tokens are short-lived, so one is obtained per gateway operation rather than
/// cached across requests.
impl PaymentGateway for PayHubGateway {
    async fn open_payment(
        &self,
        amount: Money,
        currency: &str,
        correlation_id: &str,
    ) -> Result<GatewayPayment, GatewayError> {
        let token = self.api.obtain_token().await.map_err(into_gateway_error)?;
        let opened = self.api.open_payment(&token, amount, currency, correlation_id).await.map_err(into_gateway_error)?;
        Ok(GatewayPayment { external_id: opened.external_id, redirect_url: opened.redirect_url })
    }

    async fn confirm_payment(&self, external_id: &str) -> Result<GatewayConfirmation, GatewayError> {
        let token = self.api.obtain_token().await.map_err(into_gateway_error)?;
        let executed = self.api.execute_payment(&token, external_id).await.map_err(into_gateway_error)?;
        debug!("PayHub reports status '{}' for payment {external_id}", executed.status);
        Ok(GatewayConfirmation {
            confirmed: executed.is_confirmed(),
            transaction_id: executed.transaction_id,
            raw_status: executed.status,
        })
    }
}

fn into_gateway_error(e: PayHubApiError) -> GatewayError {
    match e {
        PayHubApiError::Authentication(msg) => GatewayError::Authentication(msg),
        PayHubApiError::JsonError(msg) => GatewayError::InvalidResponse(msg),
        PayHubApiError::QueryError { status, message } if status < 500 => {
            GatewayError::InvalidResponse(format!("HTTP {status}: {message}"))
        },
        other => GatewayError::Network(other.to_string()),
    }
}
