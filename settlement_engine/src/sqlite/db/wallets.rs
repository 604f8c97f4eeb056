use gsp_common::Money;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{EntryDirection, LedgerEntry, WalletAccount},
    traits::SettlementError,
};

pub async fn fetch_wallet_account(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<WalletAccount>, sqlx::Error> {
    let account = sqlx::query_as("SELECT * FROM wallet_accounts WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(account)
}

/// Fetches the user's wallet, provisioning an empty one if this is their first wallet mutation.
/// Wallets are created lazily; browsing users who never top up get no row.
pub async fn fetch_or_create_wallet_account(
    user_id: &str,
    currency: &str,
    conn: &mut SqliteConnection,
) -> Result<WalletAccount, SettlementError> {
    if let Some(account) = fetch_wallet_account(user_id, &mut *conn).await? {
        return Ok(account);
    }
    let account = sqlx::query_as(
        r#"
            INSERT INTO wallet_accounts (user_id, balance, currency) VALUES ($1, 0, $2)
            RETURNING *;
        "#,
    )
    .bind(user_id)
    .bind(currency)
    .fetch_one(conn)
    .await?;
    debug!("🪪️ Provisioned wallet account for user [{user_id}]");
    Ok(account)
}

/// Applies a balance mutation to the account and writes the matching ledger entry in the same
/// connection. The two writes must share a transaction with the caller; the balance is never
/// updated without its entry, and vice versa.
///
/// A debit that would take the balance below zero is refused.
pub async fn apply_entry(
    account_id: i64,
    direction: EntryDirection,
    amount: Money,
    description: &str,
    conn: &mut SqliteConnection,
) -> Result<Money, SettlementError> {
    if !amount.is_positive() {
        return Err(SettlementError::FulfillmentError(format!(
            "Ledger amounts must be positive, got {amount}"
        )));
    }
    let delta = match direction {
        EntryDirection::Credit => amount,
        EntryDirection::Debit => -amount,
    };
    let updated: Option<(Money,)> = sqlx::query_as(
        r#"
            UPDATE wallet_accounts
            SET balance = balance + $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND balance + $2 >= 0
            RETURNING balance;
        "#,
    )
    .bind(account_id)
    .bind(delta)
    .fetch_optional(&mut *conn)
    .await?;
    let (new_balance,) = updated.ok_or_else(|| {
        SettlementError::FulfillmentError(format!("Insufficient funds in account {account_id} for {direction}"))
    })?;
    sqlx::query(
        r#"
            INSERT INTO wallet_entries (account_id, direction, amount, description, status)
            VALUES ($1, $2, $3, $4, 'Completed');
        "#,
    )
    .bind(account_id)
    .bind(direction.to_string())
    .bind(amount)
    .bind(description)
    .execute(conn)
    .await?;
    debug!("💰️ {direction} of {amount} applied to account {account_id}. New balance: {new_balance}");
    Ok(new_balance)
}

pub async fn fetch_wallet_history(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    let entries = sqlx::query_as(
        r#"
            SELECT e.* FROM wallet_entries e
            JOIN wallet_accounts a ON a.id = e.account_id
            WHERE a.user_id = $1
            ORDER BY e.created_at DESC, e.id DESC;
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(entries)
}
