use sqlx::SqlitePool;

use crate::routes::models::Notification;

use super::error::ServiceError;

/// Insert a notification row for a user.
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    title: &str,
    content: &str,
) -> Result<(), ServiceError> {
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO notifications (user_id, title, content, is_read, created_at) \
         VALUES (?, ?, ?, FALSE, ?)",
    )
    .bind(user_id)
    .bind(title)
    .bind(content)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list(
    pool: &SqlitePool,
    user_id: i64,
    unread_only: bool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Notification>, ServiceError> {
    let notifications = if unread_only {
        sqlx::query_as::<_, Notification>(
            "SELECT id, title, content, is_read, created_at FROM notifications \
             WHERE user_id = ? AND is_read = FALSE \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, Notification>(
            "SELECT id, title, content, is_read, created_at FROM notifications \
             WHERE user_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?
    };

    Ok(notifications)
}

pub async fn unread_count(pool: &SqlitePool, user_id: i64) -> Result<i64, ServiceError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = FALSE",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Mark one of the user's notifications as read. Unknown or foreign ids
/// are reported as missing.
pub async fn mark_read(
    pool: &SqlitePool,
    user_id: i64,
    notification_id: i64,
) -> Result<Notification, ServiceError> {
    let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = ? AND user_id = ?")
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound);
    }

    let notification = sqlx::query_as::<_, Notification>(
        "SELECT id, title, content, is_read, created_at FROM notifications WHERE id = ?",
    )
    .bind(notification_id)
    .fetch_one(pool)
    .await?;

    Ok(notification)
}

pub async fn mark_all_read(pool: &SqlitePool, user_id: i64) -> Result<u64, ServiceError> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = ? AND is_read = FALSE")
            .bind(user_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected())
}

pub async fn delete(
    pool: &SqlitePool,
    user_id: i64,
    notification_id: i64,
) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound);
    }

    Ok(())
}
