use sqlx::SqliteConnection;

use crate::db_types::Cart;

pub async fn fetch_cart(customer_id: &str, conn: &mut SqliteConnection) -> Result<Option<Cart>, sqlx::Error> {
    let cart =
        sqlx::query_as("SELECT * FROM carts WHERE customer_id = $1").bind(customer_id).fetch_optional(conn).await?;
    Ok(cart)
}

/// Replaces the customer's cart contents. Each customer has at most one cart row.
pub async fn upsert_cart(
    customer_id: &str,
    items: &serde_json::Value,
    conn: &mut SqliteConnection,
) -> Result<Cart, sqlx::Error> {
    let cart = sqlx::query_as(
        r#"
            INSERT INTO carts (customer_id, items) VALUES ($1, $2)
            ON CONFLICT (customer_id) DO UPDATE SET items = $2, updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(customer_id)
    .bind(items.to_string())
    .fetch_one(conn)
    .await?;
    Ok(cart)
}

pub async fn delete_cart(customer_id: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM carts WHERE customer_id = $1").bind(customer_id).execute(conn).await?;
    Ok(())
}
