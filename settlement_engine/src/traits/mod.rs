//! # Database management and control.
//!
//! This module defines the interface contracts that settlement engine database *backends* must
//! expose.
//!
//! ## Intents
//! A payment intent is the durable record of a single checkout attempt. It carries everything a
//! fulfillment handler needs to act once the gateway confirms the charge, so the callback path
//! never has to reconstruct state from the browser session.
//!
//! The [`SettlementDatabase`] trait provides the mechanisms for recording intents as they enter
//! the system and for driving them to a terminal status. It is also responsible for running the
//! purpose-specific fulfillment work atomically with the status transition.
//!
//! The [`AccountManagement`] trait provides read-only queries over the records that fulfillment
//! produces, such as orders, wallet accounts, ledger entries and reseller profiles.
//!
//! ## Traits
//! * [`SettlementDatabase`] defines the highest level of behaviour for backends supporting the
//!   settlement engine.
//! * [`AccountManagement`] provides methods for querying accounts, orders and ledger history.
//! * [`PaymentGateway`] abstracts the external payment provider so the engine can be tested
//!   without network access.
mod account_management;
mod payment_gateway;
mod settlement_database;

pub use account_management::{AccountApiError, AccountManagement};
pub use payment_gateway::{GatewayConfirmation, GatewayError, GatewayPayment, PaymentGateway};
pub use settlement_database::{SettlementDatabase, SettlementError};
