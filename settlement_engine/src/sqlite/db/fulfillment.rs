//! Purpose-specific fulfillment handlers.
//!
//! Each handler runs inside the dispatcher's fulfillment transaction. A handler error rolls the
//! whole transaction back, leaving the intent `Pending` so a retried callback can try again.
//! Handlers return the row id of the entity they created; the dispatcher records it on the intent
//! as the `result_id`.

use chrono::{Duration, Utc};
use log::{debug, info};
use sqlx::SqliteConnection;

use crate::{
    db_types::{EntryDirection, Order, PaymentIntent, Reseller, WalletAccount},
    helpers::subdomain_candidate,
    payloads::{OrderPayload, RegistrationPayload, TopUpPayload},
    sqlite::db::{notifications, orders, redeem_codes, resellers, wallets},
    traits::SettlementError,
};

/// Markup bounds, in basis points, granted to a freshly provisioned reseller store.
const DEFAULT_MARKUP_MIN_BPS: i64 = 500;
const DEFAULT_MARKUP_MAX_BPS: i64 = 3_000;

/// How many subdomain candidates to try before giving up on provisioning the store.
const MAX_SUBDOMAIN_ATTEMPTS: u32 = 5;

/// Recipient id for operator-facing notification rows. Fan-out to individual operator accounts
/// is the delivery layer's job.
const ADMIN_RECIPIENT: &str = "admin";

/// Creates the order from the snapshotted cart, mints redeem codes for any prepaid-code lines
/// (one per unit), deletes the now-converted cart, and queues the confirmation notification.
pub async fn fulfill_order(
    intent: &PaymentIntent,
    payload: &OrderPayload,
    transaction_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, SettlementError> {
    let order =
        orders::insert_order(&intent.user_id, intent.id, &payload.cart, &intent.currency, transaction_id, conn)
            .await?;
    let mut minted = 0usize;
    for line in &payload.cart.lines {
        if let Some(spec) = &line.prepaid_code {
            let expires_at = Utc::now() + Duration::days(spec.validity_days);
            for _ in 0..line.quantity {
                redeem_codes::mint_code(spec.value, &intent.currency, expires_at, Some(order.id), conn).await?;
                minted += 1;
            }
        }
    }
    if minted > 0 {
        debug!("🎟️ Minted {minted} redeem code(s) for order [{}]", order.order_number);
    }
    super::carts::delete_cart(&intent.user_id, &mut *conn).await?;
    notifications::enqueue(
        &intent.user_id,
        "Order confirmed",
        &format!("Your order {} for {} {} has been paid.", order.order_number, order.total, order.currency),
        "order_confirmed",
        Some(&serde_json::json!({ "order_number": order.order_number })),
        conn,
    )
    .await?;
    info!("📦️ Order [{}] fulfilled for user [{}]", order.order_number, intent.user_id);
    Ok(order)
}

/// Credits the paid amount to the user's wallet, provisioning the wallet on first use.
pub async fn fulfill_wallet_topup(
    intent: &PaymentIntent,
    payload: &TopUpPayload,
    conn: &mut SqliteConnection,
) -> Result<WalletAccount, SettlementError> {
    let account = wallets::fetch_or_create_wallet_account(&intent.user_id, &intent.currency, conn).await?;
    let new_balance = wallets::apply_entry(
        account.id,
        EntryDirection::Credit,
        payload.amount,
        &format!("Wallet top-up ({})", intent.correlation_id),
        conn,
    )
    .await?;
    notifications::enqueue(
        &intent.user_id,
        "Wallet topped up",
        &format!("{} {} added to your wallet. New balance: {new_balance} {}.",
            payload.amount, account.currency, account.currency),
        "wallet_topup",
        None,
        conn,
    )
    .await?;
    info!("💰️ Wallet top-up of {} fulfilled for user [{}]", payload.amount, intent.user_id);
    Ok(account)
}

/// Creates the reseller profile in `Pending` status and provisions their sub-store under a
/// unique subdomain, then queues a welcome notification to the new account and an application
/// notification to the operators.
///
/// The subdomain is derived from the business name; on a collision with an existing store a
/// suffixed candidate is generated and retried, all inside the surrounding transaction.
pub async fn fulfill_reseller_onboarding(
    intent: &PaymentIntent,
    payload: &RegistrationPayload,
    conn: &mut SqliteConnection,
) -> Result<Reseller, SettlementError> {
    let reseller = resellers::insert_reseller(payload, conn).await?;
    let mut store = None;
    for attempt in 0..MAX_SUBDOMAIN_ATTEMPTS {
        let candidate = subdomain_candidate(&payload.business_name, attempt);
        if let Some(s) =
            resellers::try_insert_store(reseller.id, &candidate, DEFAULT_MARKUP_MIN_BPS, DEFAULT_MARKUP_MAX_BPS, conn)
                .await?
        {
            store = Some(s);
            break;
        }
        debug!("🪛️ Subdomain '{candidate}' is taken. Regenerating.");
    }
    let store = store.ok_or_else(|| SettlementError::SubdomainExhausted(payload.business_name.clone()))?;
    notifications::enqueue(
        &payload.email,
        "Application received",
        &format!(
            "Your store is reserved at {}.gsp.example and will open once your application is approved.",
            store.subdomain
        ),
        "reseller_onboarded",
        Some(&serde_json::json!({ "subdomain": store.subdomain })),
        conn,
    )
    .await?;
    notifications::enqueue(
        ADMIN_RECIPIENT,
        "New reseller application",
        &format!("{} applied as '{}' with subdomain {}.gsp.example.", payload.email, payload.business_name, store.subdomain),
        "reseller_application",
        Some(&serde_json::json!({ "email": payload.email, "subdomain": store.subdomain })),
        conn,
    )
    .await?;
    info!("🧑️ Reseller [{}] onboarded with store '{}', pending review", payload.email, store.subdomain);
    Ok(reseller)
}
