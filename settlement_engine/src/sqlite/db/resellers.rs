use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Reseller, StoreRecord},
    payloads::RegistrationPayload,
    traits::SettlementError,
};

/// Inserts the reseller row. The account starts in `Pending` status (the table default) and is
/// activated out of band once the application has been reviewed.
pub async fn insert_reseller(
    registration: &RegistrationPayload,
    conn: &mut SqliteConnection,
) -> Result<Reseller, SettlementError> {
    let result = sqlx::query_as(
        r#"
            INSERT INTO resellers (email, name, business_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(&registration.email)
    .bind(&registration.name)
    .bind(&registration.business_name)
    .bind(&registration.password_hash)
    .fetch_one(conn)
    .await;
    match result {
        Ok(reseller) => {
            debug!("🧑️ Reseller [{}] registered", registration.email);
            Ok(reseller)
        },
        Err(e) if e.as_database_error().map(|de| de.is_unique_violation()).unwrap_or(false) => {
            Err(SettlementError::ResellerAlreadyExists(registration.email.clone()))
        },
        Err(e) => Err(e.into()),
    }
}

/// Inserts the reseller's store row. Returns `Ok(None)` when the subdomain is already taken, so
/// the caller can regenerate a candidate and try again within the same transaction.
pub async fn try_insert_store(
    reseller_id: i64,
    subdomain: &str,
    markup_min: i64,
    markup_max: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<StoreRecord>, SettlementError> {
    let result = sqlx::query_as(
        r#"
            INSERT INTO stores (reseller_id, subdomain, markup_min, markup_max)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(reseller_id)
    .bind(subdomain)
    .bind(markup_min)
    .bind(markup_max)
    .fetch_one(conn)
    .await;
    match result {
        Ok(store) => Ok(Some(store)),
        Err(e) if e.as_database_error().map(|de| de.is_unique_violation()).unwrap_or(false) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_reseller_by_email(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Reseller>, sqlx::Error> {
    let reseller = sqlx::query_as("SELECT * FROM resellers WHERE email = $1").bind(email).fetch_optional(conn).await?;
    Ok(reseller)
}

pub async fn fetch_store_for_reseller(
    reseller_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<StoreRecord>, sqlx::Error> {
    let store =
        sqlx::query_as("SELECT * FROM stores WHERE reseller_id = $1").bind(reseller_id).fetch_optional(conn).await?;
    Ok(store)
}
