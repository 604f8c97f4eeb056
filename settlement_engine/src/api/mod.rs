//! The public settlement APIs.
//!
//! [`SettlementApi`] drives the write path: initializing checkouts, settling gateway callbacks
//! and redeeming prepaid codes. [`WalletApi`] is the read-only companion for account queries.
mod errors;
mod settlement_flow_api;
mod wallet_api;

pub use errors::SettlementApiError;
pub use settlement_flow_api::{CallbackOutcome, InitializedCheckout, OnboardingRequest, SettlementApi};
pub use wallet_api::WalletApi;
