use log::debug;
use sqlx::SqlitePool;

use crate::{
    db_types::{
        Cart,
        EntryDirection,
        IntentStatus,
        LedgerEntry,
        NewPaymentIntent,
        Notification,
        Order,
        OrderItem,
        PaymentIntent,
        RedeemCode,
        RedeemReceipt,
        Reseller,
        StoreRecord,
        WalletAccount,
    },
    sqlite::db,
    traits::{AccountApiError, AccountManagement, SettlementDatabase, SettlementError},
};

/// The SQLite backend for the settlement engine.
///
/// Cheap to clone; the pool is shared. All multi-write operations run inside a single database
/// transaction obtained from the pool.
#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDatabase").field("url", &self.url).finish()
    }
}

impl SqliteDatabase {
    /// Creates a new database instance using the URL from the `GSP_DATABASE_URL` environment
    /// variable, or the default if unset.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db::db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = db::new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl SettlementDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        db::intents::insert_intent(intent, &mut conn).await
    }

    async fn fetch_intent(&self, correlation_id: &str) -> Result<PaymentIntent, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        db::intents::fetch_intent_by_correlation_id(correlation_id, &mut conn)
            .await?
            .ok_or_else(|| SettlementError::IntentNotFound(correlation_id.to_string()))
    }

    async fn fulfill_intent(
        &self,
        intent: &PaymentIntent,
        transaction_id: &str,
    ) -> Result<PaymentIntent, SettlementError> {
        use crate::payloads::IntentPayload;
        let payload = intent.payload().map_err(|e| SettlementError::InvalidPayload(e.to_string()))?;
        let mut tx = self.pool.begin().await?;
        let result_id = match &payload {
            IntentPayload::Order(p) => {
                db::fulfillment::fulfill_order(intent, p, transaction_id, &mut tx).await?.id
            },
            IntentPayload::WalletTopup(p) => db::fulfillment::fulfill_wallet_topup(intent, p, &mut tx).await?.id,
            IntentPayload::ResellerOnboarding(p) => {
                db::fulfillment::fulfill_reseller_onboarding(intent, p, &mut tx).await?.id
            },
        };
        let updated = db::intents::complete_intent(&intent.correlation_id, transaction_id, result_id, &mut tx).await?;
        tx.commit().await?;
        debug!("✅️ Intent [{}] completed with result id {result_id}", intent.correlation_id);
        Ok(updated)
    }

    async fn finalize_intent(
        &self,
        correlation_id: &str,
        status: IntentStatus,
        failure_reason: Option<&str>,
    ) -> Result<PaymentIntent, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        db::intents::finalize_intent(correlation_id, status, failure_reason, &mut conn).await
    }

    async fn redeem_code(&self, code: &str, user_id: &str) -> Result<RedeemReceipt, SettlementError> {
        let mut tx = self.pool.begin().await?;
        let consumed = db::redeem_codes::consume_code(code, user_id, &mut tx).await?;
        let account =
            db::wallets::fetch_or_create_wallet_account(user_id, &consumed.currency, &mut tx).await?;
        let new_balance = db::wallets::apply_entry(
            account.id,
            EntryDirection::Credit,
            consumed.amount,
            &format!("Redeemed code {code}"),
            &mut tx,
        )
        .await?;
        db::notifications::enqueue(
            user_id,
            "Code redeemed",
            &format!("{} {} credited to your wallet.", consumed.amount, consumed.currency),
            "code_redeemed",
            None,
            &mut tx,
        )
        .await?;
        tx.commit().await?;
        Ok(RedeemReceipt { account_id: account.id, credited: consumed.amount, new_balance })
    }

    async fn fetch_cart(&self, customer_id: &str) -> Result<Option<Cart>, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::carts::fetch_cart(customer_id, &mut conn).await?)
    }

    async fn save_cart(&self, customer_id: &str, items: &serde_json::Value) -> Result<Cart, SettlementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::carts::upsert_cart(customer_id, items, &mut conn).await?)
    }

    async fn clear_cart(&self, customer_id: &str) -> Result<(), SettlementError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::carts::delete_cart(customer_id, &mut conn).await?)
    }

    async fn close(&mut self) -> Result<(), SettlementError> {
        self.pool.close().await;
        Ok(())
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_wallet_account(&self, user_id: &str) -> Result<Option<WalletAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::wallets::fetch_wallet_account(user_id, &mut conn).await?)
    }

    async fn fetch_wallet_history(&self, user_id: &str) -> Result<Vec<LedgerEntry>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::wallets::fetch_wallet_history(user_id, &mut conn).await?)
    }

    async fn fetch_order(&self, order_number: &str) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::orders::fetch_order_by_number(order_number, &mut conn).await?)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::orders::fetch_order_items(order_id, &mut conn).await?)
    }

    async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::orders::fetch_orders_for_customer(customer_id, &mut conn).await?)
    }

    async fn fetch_reseller(&self, email: &str) -> Result<Option<Reseller>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::resellers::fetch_reseller_by_email(email, &mut conn).await?)
    }

    async fn fetch_store_for_reseller(&self, reseller_id: i64) -> Result<Option<StoreRecord>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::resellers::fetch_store_for_reseller(reseller_id, &mut conn).await?)
    }

    async fn fetch_redeem_code(&self, code: &str) -> Result<Option<RedeemCode>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::redeem_codes::fetch_code(code, &mut conn).await?)
    }

    async fn fetch_notifications(&self, recipient: &str) -> Result<Vec<Notification>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(db::notifications::fetch_for_recipient(recipient, &mut conn).await?)
    }
}
