//! Settlement Engine
//!
//! The settlement engine is the payment settlement and transactional fulfillment core of the
//! gaming-goods storefront. It owns the full life of a payment: a checkout becomes a durable
//! payment intent, the intent is charged through an external gateway, and a confirmed charge is
//! converted into exactly one fulfillment (an order, a wallet credit, or a provisioned reseller)
//! inside a single database transaction.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). Currently SQLite is the supported
//!    backend. You should never need to access the database directly; use the public API instead.
//!    The exception is the data types used in the database, defined in the public `db_types`
//!    module.
//! 2. The public API ([`mod@api`]). [`SettlementApi`] implements the initialize / callback /
//!    redeem flows; [`WalletApi`] serves read-only account queries. Backends implement the traits
//!    in the `traits` module to plug in.
//!
//! Two invariants the whole crate is organised around:
//! * An intent moves from `Pending` to exactly one terminal status, exactly once. Every terminal
//!   write is guarded by a `status = 'Pending'` predicate, which is also the idempotency gate for
//!   replayed and concurrent callbacks.
//! * Fulfillment side effects and the intent's completion commit in one transaction. There is no
//!   state where goods were delivered but the intent is still `Pending`, or vice versa.
mod api;

pub mod db_types;
pub mod helpers;
pub mod payloads;
pub mod redirects;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{
    CallbackOutcome,
    InitializedCheckout,
    OnboardingRequest,
    SettlementApi,
    SettlementApiError,
    WalletApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{AccountManagement, PaymentGateway, SettlementDatabase};
