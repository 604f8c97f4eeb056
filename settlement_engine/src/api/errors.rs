use thiserror::Error;

use crate::{
    helpers::PasswordHashError,
    payloads::PayloadValidationError,
    traits::{AccountApiError, GatewayError, SettlementError},
};

#[derive(Debug, Error)]
pub enum SettlementApiError {
    #[error("{0}")]
    Validation(#[from] PayloadValidationError),
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("{0}")]
    Settlement(#[from] SettlementError),
    #[error("{0}")]
    Account(#[from] AccountApiError),
    #[error("{0}")]
    PasswordHash(#[from] PasswordHashError),
    #[error("Could not encode or decode a payload: {0}")]
    PayloadEncoding(#[from] serde_json::Error),
    #[error("There is no cart to check out for customer {0}")]
    EmptyCart(String),
}
