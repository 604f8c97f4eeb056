use chrono::{NaiveDate, Utc};
use gsp_common::Money;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Order, OrderItem},
    helpers::format_order_number,
    payloads::CartSnapshot,
    traits::SettlementError,
};

/// Bumps and returns the order counter for the given day. The upsert makes the sequence safe
/// under concurrent checkouts; run it inside the fulfillment transaction so an aborted
/// fulfillment does not burn a number.
pub async fn next_order_sequence(day: NaiveDate, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let (counter,): (i64,) = sqlx::query_as(
        r#"
            INSERT INTO order_counters (day, counter) VALUES ($1, 1)
            ON CONFLICT (day) DO UPDATE SET counter = counter + 1
            RETURNING counter;
        "#,
    )
    .bind(day.format("%Y-%m-%d").to_string())
    .fetch_one(conn)
    .await?;
    Ok(counter)
}

/// Inserts an order and its line items from the snapshotted cart. Not atomic on its own; callers
/// wrap it in the fulfillment transaction.
pub async fn insert_order(
    customer_id: &str,
    intent_id: i64,
    cart: &CartSnapshot,
    currency: &str,
    transaction_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, SettlementError> {
    let day = Utc::now().date_naive();
    let seq = next_order_sequence(day, conn).await?;
    let order_number = format_order_number(day, seq);
    let total = cart.total();
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                customer_id,
                intent_id,
                total,
                currency,
                fulfillment_status,
                payment_status,
                transaction_id
            ) VALUES ($1, $2, $3, $4, $5, 'Processing', 'Paid', $6)
            RETURNING *;
        "#,
    )
    .bind(&order_number)
    .bind(customer_id)
    .bind(intent_id)
    .bind(total)
    .bind(currency)
    .bind(transaction_id)
    .fetch_one(&mut *conn)
    .await?;
    for line in &cart.lines {
        sqlx::query(
            r#"
                INSERT INTO order_items (order_id, product_id, title, variant, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6, $7);
            "#,
        )
        .bind(order.id)
        .bind(&line.product_id)
        .bind(&line.title)
        .bind(&line.variant)
        .bind(line.quantity as i64)
        .bind(line.unit_price)
        .bind(line.subtotal())
        .execute(&mut *conn)
        .await?;
    }
    debug!("📝️ Order [{order_number}] inserted with id {} ({} cents)", order.id, total.value());
    Ok(order)
}

pub async fn fetch_order_by_number(
    order_number: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE order_number = $1")
        .bind(order_number)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn fetch_orders_for_customer(
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(customer_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Totals for sanity checks in admin tooling.
pub async fn order_total(order_id: i64, conn: &mut SqliteConnection) -> Result<Money, sqlx::Error> {
    let (total,): (Money,) = sqlx::query_as("SELECT COALESCE(SUM(subtotal), 0) FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_one(conn)
        .await?;
    Ok(total)
}
