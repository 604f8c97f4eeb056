use std::env;

use log::*;
use payhub_tools::PayHubConfig;

const DEFAULT_GSP_HOST: &str = "127.0.0.1";
const DEFAULT_GSP_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Payment gateway credentials and endpoint.
    pub payhub: PayHubConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GSP_HOST.to_string(),
            port: DEFAULT_GSP_PORT,
            database_url: String::default(),
            payhub: PayHubConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("GSP_HOST").ok().unwrap_or_else(|| DEFAULT_GSP_HOST.into());
        let port = env::var("GSP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for GSP_PORT. {e} Using the default, {DEFAULT_GSP_PORT}, instead."
                    );
                    DEFAULT_GSP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_GSP_PORT);
        let database_url = settlement_engine::sqlite::db::db_url();
        let payhub = PayHubConfig::new_from_env_or_default();
        Self { host, port, database_url, payhub }
    }
}
