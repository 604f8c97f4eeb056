use log::*;
use gsp_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct PayHubConfig {
    /// Base URL of the PayHub API, e.g. `https://api.payhub.example.com/v2`
    pub base_url: String,
    pub merchant_id: String,
    pub api_key: Secret<String>,
    /// Request timeout in seconds. Gateway calls must be bounded; a timed-out confirm is a gateway
    /// error, never a success or failure verdict.
    pub timeout_secs: u64,
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl PayHubConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("GSP_PAYHUB_BASE_URL").unwrap_or_else(|_| {
            warn!("GSP_PAYHUB_BASE_URL not set, using (probably useless) default");
            "https://api.payhub.example.com/v2".to_string()
        });
        let merchant_id = std::env::var("GSP_PAYHUB_MERCHANT_ID").unwrap_or_else(|_| {
            warn!("GSP_PAYHUB_MERCHANT_ID not set, using (probably useless) default");
            "merchant-0000".to_string()
        });
        let api_key = Secret::new(std::env::var("GSP_PAYHUB_API_KEY").unwrap_or_else(|_| {
            warn!("GSP_PAYHUB_API_KEY not set, using (probably useless) default");
            "ph_00000000000000".to_string()
        }));
        let timeout_secs = std::env::var("GSP_PAYHUB_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self { base_url, merchant_id, api_key, timeout_secs }
    }
}
