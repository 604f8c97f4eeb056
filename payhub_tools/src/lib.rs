//! Client library for the PayHub payment gateway.
//!
//! PayHub exposes exactly three operations that the settlement engine needs: obtaining a short-lived
//! access token, opening a payment (which yields a redirect URL for the shopper), and executing a
//! previously-opened payment to learn its final status. Everything else about the gateway's protocol
//! is its own business.
//!
//! This crate is a pure I/O boundary. It holds no business state and performs no retries; callers
//! decide what a failed call means.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::PayHubApi;
pub use config::PayHubConfig;
pub use data_objects::{AccessToken, ExecutedPayment, OpenedPayment};
pub use error::PayHubApiError;
