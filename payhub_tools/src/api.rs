use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use gsp_common::Money;

use crate::{
    config::PayHubConfig,
    data_objects::{AccessToken, ExecutedPayment, OpenedPayment},
    PayHubApiError,
};

#[derive(Clone)]
pub struct PayHubApi {
    config: PayHubConfig,
    client: Arc<Client>,
}

impl PayHubApi {
    pub fn new(config: PayHubConfig) -> Result<Self, PayHubApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PayHubApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<B>,
    ) -> Result<T, PayHubApiError> {
        let url = self.url(path);
        trace!("Sending PayHub query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| PayHubApiError::ResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("PayHub query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| PayHubApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PayHubApiError::ResponseError(e.to_string()))?;
            if status == 401 || status == 403 {
                return Err(PayHubApiError::Authentication(message));
            }
            Err(PayHubApiError::QueryError { status, message })
        }
    }

    /// Obtain a short-lived access token using the merchant credentials.
    pub async fn obtain_token(&self) -> Result<AccessToken, PayHubApiError> {
        let body = serde_json::json!({
            "merchant_id": self.config.merchant_id,
            "api_key": self.config.api_key.reveal(),
        });
        debug!("Requesting PayHub access token for merchant {}", self.config.merchant_id);
        let token = self.rest_query::<AccessToken, _>(Method::POST, "/oauth/token", None, Some(body)).await?;
        trace!("PayHub token obtained, expires in {}s", token.expires_in);
        Ok(token)
    }

    /// Open a new payment at the gateway. The returned `redirect_url` is where the shopper completes
    /// the charge; `correlation_id` ties the gateway payment back to our intent record.
    pub async fn open_payment(
        &self,
        token: &AccessToken,
        amount: Money,
        currency: &str,
        correlation_id: &str,
    ) -> Result<OpenedPayment, PayHubApiError> {
        let body = serde_json::json!({
            "amount": amount.to_string(),
            "currency": currency,
            "reference": correlation_id,
        });
        debug!("Opening PayHub payment of {amount} {currency} [ref {correlation_id}]");
        let opened =
            self.rest_query::<OpenedPayment, _>(Method::POST, "/payments", Some(&token.access_token), Some(body)).await?;
        info!("Opened PayHub payment {} [ref {correlation_id}]", opened.external_id);
        Ok(opened)
    }

    /// Execute a previously-opened payment and learn its final status. This is the only trustworthy
    /// source for the outcome of a charge.
    pub async fn execute_payment(
        &self,
        token: &AccessToken,
        external_id: &str,
    ) -> Result<ExecutedPayment, PayHubApiError> {
        let path = format!("/payments/{external_id}/execute");
        debug!("Executing PayHub payment {external_id}");
        let executed = self.rest_query::<ExecutedPayment, ()>(Method::POST, &path, Some(&token.access_token), None).await?;
        info!("PayHub payment {external_id} executed with status {}", executed.status);
        Ok(executed)
    }
}
