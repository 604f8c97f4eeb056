use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{IntentStatus, NewPaymentIntent, PaymentIntent},
    traits::SettlementError,
};

/// Inserts a new payment intent using the given connection. This is not atomic. You can embed
/// this call inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the
/// connection argument.
pub async fn insert_intent(
    intent: NewPaymentIntent,
    conn: &mut SqliteConnection,
) -> Result<PaymentIntent, SettlementError> {
    let correlation_id = intent.correlation_id.clone();
    let result = sqlx::query_as(
        r#"
            INSERT INTO payment_intents (
                correlation_id,
                external_id,
                user_id,
                amount,
                currency,
                purpose,
                payload
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(intent.correlation_id)
    .bind(intent.external_id)
    .bind(intent.user_id)
    .bind(intent.amount)
    .bind(intent.currency)
    .bind(intent.purpose)
    .bind(intent.payload)
    .fetch_one(conn)
    .await;
    match result {
        Ok(intent) => {
            debug!("💳️ Intent [{correlation_id}] recorded");
            Ok(intent)
        },
        Err(e) if e.as_database_error().map(|de| de.is_unique_violation()).unwrap_or(false) => {
            Err(SettlementError::IntentAlreadyExists(correlation_id))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_intent_by_correlation_id(
    correlation_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentIntent>, sqlx::Error> {
    let intent = sqlx::query_as("SELECT * FROM payment_intents WHERE correlation_id = $1")
        .bind(correlation_id)
        .fetch_optional(conn)
        .await?;
    Ok(intent)
}

/// Marks a `Pending` intent as `Completed`, recording the gateway transaction id and the id of
/// the entity the fulfillment handler created.
///
/// The `status = 'Pending'` predicate is the concurrency gate: when two dispatchers race on the
/// same callback, exactly one sees an updated row here. The loser gets
/// [`SettlementError::IntentAlreadyFinalized`] and should re-fetch the winner's result.
pub async fn complete_intent(
    correlation_id: &str,
    transaction_id: &str,
    result_id: i64,
    conn: &mut SqliteConnection,
) -> Result<PaymentIntent, SettlementError> {
    let updated: Option<PaymentIntent> = sqlx::query_as(
        r#"
            UPDATE payment_intents
            SET status = 'Completed',
                transaction_id = $2,
                result_id = $3,
                finalized_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE correlation_id = $1 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(correlation_id)
    .bind(transaction_id)
    .bind(result_id)
    .fetch_optional(conn)
    .await?;
    updated.ok_or_else(|| SettlementError::IntentAlreadyFinalized(correlation_id.to_string()))
}

/// Moves a `Pending` intent to a terminal non-success status. Guarded by the same
/// `status = 'Pending'` predicate as [`complete_intent`].
pub async fn finalize_intent(
    correlation_id: &str,
    status: IntentStatus,
    failure_reason: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<PaymentIntent, SettlementError> {
    let updated: Option<PaymentIntent> = sqlx::query_as(
        r#"
            UPDATE payment_intents
            SET status = $2,
                failure_reason = $3,
                finalized_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE correlation_id = $1 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(correlation_id)
    .bind(status.to_string())
    .bind(failure_reason)
    .fetch_optional(conn)
    .await?;
    updated.ok_or_else(|| SettlementError::IntentAlreadyFinalized(correlation_id.to_string()))
}
