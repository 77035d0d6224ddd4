/// Notification model with per-user read tracking
///
/// A notification is a broadcast: one immutable row visible to every user.
/// Read state lives in a separate join table keyed by
/// (notification, user), so marking read is additive-only and the
/// notification itself is never touched after creation.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notifications (
///     notification_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     message TEXT NOT NULL,
///     created_by UUID REFERENCES users(user_id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     priority VARCHAR(20) NOT NULL DEFAULT 'normal'
///         CHECK (priority IN ('low', 'normal', 'high'))
/// );
///
/// CREATE TABLE notification_reads (
///     read_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     notification_id UUID NOT NULL REFERENCES notifications(notification_id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
///     read_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (notification_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Notification priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// Informational
    Low,

    /// Default
    Normal,

    /// Important
    High,
}

impl NotificationPriority {
    /// Converts priority to its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Low => "low",
            NotificationPriority::Normal => "normal",
            NotificationPriority::High => "high",
        }
    }
}

/// Notification model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID
    pub notification_id: Uuid,

    /// Headline
    pub title: String,

    /// Body text
    pub message: String,

    /// Admin who sent it
    pub created_by: Option<Uuid>,

    /// When it was broadcast
    pub created_at: DateTime<Utc>,

    /// Priority level
    pub priority: NotificationPriority,
}

/// Input for broadcasting a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    /// Headline
    pub title: String,

    /// Body text
    pub message: String,

    /// Priority level
    pub priority: NotificationPriority,

    /// Admin sending it
    pub created_by: Option<Uuid>,
}

impl Notification {
    /// Broadcasts a notification to all users
    pub async fn broadcast(pool: &PgPool, data: CreateNotification) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (title, message, priority, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.message)
        .bind(data.priority)
        .bind(data.created_by)
        .fetch_one(pool)
        .await
    }

    /// Finds a notification by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE notification_id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists all notifications, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    /// Marks a notification read for a user
    ///
    /// Idempotent: a duplicate mark hits the (notification, user) unique
    /// constraint and is swallowed by ON CONFLICT DO NOTHING, so the
    /// original `read_at` is preserved. Returns `true` if this call
    /// recorded the read, `false` if it was already read.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO notification_reads (notification_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (notification_id, user_id) DO NOTHING
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists notifications a user has not read yet, newest first
    ///
    /// Anti-join against the read table: a notification is unread when no
    /// read row exists for this user.
    pub async fn unread_for(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT n.*
            FROM notifications n
            LEFT JOIN notification_reads nr
                ON n.notification_id = nr.notification_id AND nr.user_id = $1
            WHERE nr.notification_id IS NULL
            ORDER BY n.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Counts a user's unread notifications
    pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM notifications n
            LEFT JOIN notification_reads nr
                ON n.notification_id = nr.notification_id AND nr.user_id = $1
            WHERE nr.notification_id IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_as_str() {
        assert_eq!(NotificationPriority::Low.as_str(), "low");
        assert_eq!(NotificationPriority::Normal.as_str(), "normal");
        assert_eq!(NotificationPriority::High.as_str(), "high");
    }

    #[test]
    fn test_priority_serde_matches_check_constraint() {
        let json = serde_json::to_string(&NotificationPriority::Normal).unwrap();
        assert_eq!(json, "\"normal\"");
    }
}
