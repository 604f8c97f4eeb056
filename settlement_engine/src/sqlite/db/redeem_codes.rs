use chrono::{DateTime, Utc};
use gsp_common::Money;
use log::{debug, warn};
use sqlx::SqliteConnection;

use crate::{
    db_types::{RedeemCode, RedeemCodeStatus},
    helpers::new_redeem_code,
    traits::SettlementError,
};

/// How many freshly generated codes we will try before giving up on a unique one. At 32^12 code
/// space a single collision is already remarkable.
const MAX_MINT_ATTEMPTS: usize = 5;

/// Mints a new active redeem code worth `amount`, optionally linked to the order that purchased
/// it. Regenerates on the (vanishingly unlikely) code collision.
pub async fn mint_code(
    amount: Money,
    currency: &str,
    expires_at: DateTime<Utc>,
    order_id: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<RedeemCode, SettlementError> {
    for attempt in 0..MAX_MINT_ATTEMPTS {
        let code = new_redeem_code();
        let result = sqlx::query_as(
            r#"
                INSERT INTO redeem_codes (code, amount, currency, status, expires_at, order_id)
                VALUES ($1, $2, $3, 'Active', $4, $5)
                RETURNING *;
            "#,
        )
        .bind(&code)
        .bind(amount)
        .bind(currency)
        .bind(expires_at)
        .bind(order_id)
        .fetch_one(&mut *conn)
        .await;
        match result {
            Ok(code) => return Ok(code),
            Err(e) if e.as_database_error().map(|de| de.is_unique_violation()).unwrap_or(false) => {
                warn!("🎟️ Redeem code collision on attempt {attempt}. Regenerating.");
            },
            Err(e) => return Err(e.into()),
        }
    }
    Err(SettlementError::FulfillmentError("Could not mint a unique redeem code".to_string()))
}

pub async fn fetch_code(code: &str, conn: &mut SqliteConnection) -> Result<Option<RedeemCode>, sqlx::Error> {
    let code = sqlx::query_as("SELECT * FROM redeem_codes WHERE code = $1").bind(code).fetch_optional(conn).await?;
    Ok(code)
}

/// Consumes an active code on behalf of `user_id`. The `status = 'Active'` predicate makes the
/// transition one-way; a concurrent redeemer of the same code loses here and gets an error.
///
/// A code past its expiry date is flipped to `Expired` instead, and the redemption is refused.
pub async fn consume_code(
    code: &str,
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<RedeemCode, SettlementError> {
    let existing = fetch_code(code, &mut *conn).await?.ok_or_else(|| SettlementError::CodeNotFound(code.to_string()))?;
    match existing.status {
        RedeemCodeStatus::Used => {
            return Err(SettlementError::CodeNotRedeemable(code.to_string(), "it has already been used".to_string()));
        },
        RedeemCodeStatus::Expired => {
            return Err(SettlementError::CodeNotRedeemable(code.to_string(), "it has expired".to_string()));
        },
        RedeemCodeStatus::Active => {},
    }
    if existing.expires_at < Utc::now() {
        sqlx::query("UPDATE redeem_codes SET status = 'Expired' WHERE id = $1 AND status = 'Active'")
            .bind(existing.id)
            .execute(conn)
            .await?;
        return Err(SettlementError::CodeNotRedeemable(code.to_string(), "it has expired".to_string()));
    }
    let consumed: Option<RedeemCode> = sqlx::query_as(
        r#"
            UPDATE redeem_codes
            SET status = 'Used', redeemed_by = $2, redeemed_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND status = 'Active'
            RETURNING *;
        "#,
    )
    .bind(existing.id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    let consumed = consumed.ok_or_else(|| {
        SettlementError::CodeNotRedeemable(code.to_string(), "it has already been used".to_string())
    })?;
    debug!("🎟️ Code [{code}] redeemed by user [{user_id}] for {}", consumed.amount);
    Ok(consumed)
}
