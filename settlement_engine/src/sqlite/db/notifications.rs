use sqlx::SqliteConnection;

use crate::db_types::Notification;

/// Queues a notification row. Delivery is somebody else's job; we only record the request so it
/// commits or rolls back together with the fulfillment that prompted it.
pub async fn enqueue(
    recipient: &str,
    title: &str,
    message: &str,
    kind: &str,
    metadata: Option<&serde_json::Value>,
    conn: &mut SqliteConnection,
) -> Result<Notification, sqlx::Error> {
    let notification = sqlx::query_as(
        r#"
            INSERT INTO notifications (recipient, title, message, kind, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(recipient)
    .bind(title)
    .bind(message)
    .bind(kind)
    .bind(metadata.map(|m| m.to_string()))
    .fetch_one(conn)
    .await?;
    Ok(notification)
}

pub async fn fetch_for_recipient(
    recipient: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, sqlx::Error> {
    let notifications = sqlx::query_as("SELECT * FROM notifications WHERE recipient = $1 ORDER BY id")
        .bind(recipient)
        .fetch_all(conn)
        .await?;
    Ok(notifications)
}
