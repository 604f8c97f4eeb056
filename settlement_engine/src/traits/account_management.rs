use thiserror::Error;

use crate::db_types::{
    LedgerEntry,
    Notification,
    Order,
    OrderItem,
    RedeemCode,
    Reseller,
    StoreRecord,
    WalletAccount,
};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// The `AccountManagement` trait defines read-only queries over the records that fulfillment
/// produces.
///
/// The [`SettlementDatabase`] trait handles the actual machinery of driving intents to a terminal
/// status. `AccountManagement` provides methods for querying the orders, wallet balances, ledger
/// entries and reseller profiles that result.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the wallet account for the given user id. If the user has never had a wallet
    /// mutation, `None` is returned.
    async fn fetch_wallet_account(&self, user_id: &str) -> Result<Option<WalletAccount>, AccountApiError>;

    /// Fetches the ledger entries for the given user's wallet, most recent first.
    async fn fetch_wallet_history(&self, user_id: &str) -> Result<Vec<LedgerEntry>, AccountApiError>;

    /// Fetches the order with the given order number, if it exists.
    async fn fetch_order(&self, order_number: &str) -> Result<Option<Order>, AccountApiError>;

    /// Fetches the line items belonging to the given order row id.
    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, AccountApiError>;

    /// Fetches the orders placed by the given customer, most recent first.
    async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, AccountApiError>;

    /// Fetches the reseller profile for the given email, if one exists.
    async fn fetch_reseller(&self, email: &str) -> Result<Option<Reseller>, AccountApiError>;

    /// Fetches the store provisioned for the given reseller row id, if any.
    async fn fetch_store_for_reseller(&self, reseller_id: i64) -> Result<Option<StoreRecord>, AccountApiError>;

    /// Fetches a redeem code record by its code string, if it exists.
    async fn fetch_redeem_code(&self, code: &str) -> Result<Option<RedeemCode>, AccountApiError>;

    /// Fetches queued notifications for the given recipient, oldest first.
    async fn fetch_notifications(&self, recipient: &str) -> Result<Vec<Notification>, AccountApiError>;
}
