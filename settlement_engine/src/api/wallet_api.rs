use crate::{
    db_types::{LedgerEntry, Notification, Order, OrderItem, RedeemCode, Reseller, StoreRecord, WalletAccount},
    traits::{AccountApiError, AccountManagement},
};

/// Read-only queries over wallets, orders and the other records fulfillment produces. Routes that
/// only display state go through here rather than the write-path [`super::SettlementApi`].
#[derive(Debug, Clone)]
pub struct WalletApi<B> {
    db: B,
}

impl<B> WalletApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn balance(&self, user_id: &str) -> Result<Option<WalletAccount>, AccountApiError> {
        self.db.fetch_wallet_account(user_id).await
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<LedgerEntry>, AccountApiError> {
        self.db.fetch_wallet_history(user_id).await
    }

    pub async fn order(&self, order_number: &str) -> Result<Option<(Order, Vec<OrderItem>)>, AccountApiError> {
        let Some(order) = self.db.fetch_order(order_number).await? else {
            return Ok(None);
        };
        let items = self.db.fetch_order_items(order.id).await?;
        Ok(Some((order, items)))
    }

    pub async fn orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, AccountApiError> {
        self.db.fetch_orders_for_customer(customer_id).await
    }

    pub async fn reseller(&self, email: &str) -> Result<Option<(Reseller, Option<StoreRecord>)>, AccountApiError> {
        let Some(reseller) = self.db.fetch_reseller(email).await? else {
            return Ok(None);
        };
        let store = self.db.fetch_store_for_reseller(reseller.id).await?;
        Ok(Some((reseller, store)))
    }

    pub async fn redeem_code(&self, code: &str) -> Result<Option<RedeemCode>, AccountApiError> {
        self.db.fetch_redeem_code(code).await
    }

    pub async fn notifications(&self, recipient: &str) -> Result<Vec<Notification>, AccountApiError> {
        self.db.fetch_notifications(recipient).await
    }
}
