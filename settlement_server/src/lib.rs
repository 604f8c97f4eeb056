//! HTTP surface for the settlement engine.
//!
//! A thin actix-web layer: routes authenticate the shopper (via the storefront's forwarded user
//! id header), translate requests into [`settlement_engine`] API calls, and map the engine's
//! errors onto HTTP statuses. All settlement logic lives in the engine; nothing here touches the
//! database directly.
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
