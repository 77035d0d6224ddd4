/// Visitor log model
///
/// Each row is one visit: entry stamps `entry_time`, exit stamps
/// `exit_time` and flips status to `out`. The transition is one-way; a
/// returning visitor gets a fresh row rather than reusing the old one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Visitor status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VisitorStatus {
    /// Currently inside the premises
    In,

    /// Has left
    Out,
}

impl VisitorStatus {
    /// Converts status to its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitorStatus::In => "in",
            VisitorStatus::Out => "out",
        }
    }
}

/// Visitor log entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Visitor {
    /// Unique visit ID
    pub visitor_id: Uuid,

    /// Flat being visited
    pub flat_number: String,

    /// Visitor's name
    pub visitor_name: String,

    /// Visitor's phone number
    pub visitor_phone: Option<String>,

    /// Purpose of the visit
    pub purpose: Option<String>,

    /// When the visitor entered
    pub entry_time: DateTime<Utc>,

    /// When the visitor left (None while still inside)
    pub exit_time: Option<DateTime<Utc>>,

    /// Vehicle registration, if any
    pub vehicle_number: Option<String>,

    /// User who logged the entry
    pub logged_by: Option<Uuid>,

    /// Whether the visitor is still inside
    pub status: VisitorStatus,
}

/// Input for logging a visitor entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVisitor {
    /// Flat being visited
    pub flat_number: String,

    /// Visitor's name
    pub visitor_name: String,

    /// Visitor's phone number
    pub visitor_phone: Option<String>,

    /// Purpose of the visit
    pub purpose: Option<String>,

    /// Vehicle registration, if any
    pub vehicle_number: Option<String>,

    /// User logging the entry
    pub logged_by: Option<Uuid>,
}

impl Visitor {
    /// Logs a visitor entering, status `in` with entry time now
    pub async fn log_entry(pool: &PgPool, data: CreateVisitor) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Visitor>(
            r#"
            INSERT INTO visitors (flat_number, visitor_name, visitor_phone, purpose, vehicle_number, logged_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&data.flat_number)
        .bind(&data.visitor_name)
        .bind(&data.visitor_phone)
        .bind(&data.purpose)
        .bind(&data.vehicle_number)
        .bind(data.logged_by)
        .fetch_one(pool)
        .await
    }

    /// Logs a visitor leaving, status `out` with exit time now
    ///
    /// Only transitions rows still in `in`; logging an exit twice returns
    /// `None` the second time.
    pub async fn log_exit(pool: &PgPool, visitor_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Visitor>(
            r#"
            UPDATE visitors
            SET status = 'out', exit_time = NOW()
            WHERE visitor_id = $1 AND status = 'in'
            RETURNING *
            "#,
        )
        .bind(visitor_id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a visit by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Visitor>("SELECT * FROM visitors WHERE visitor_id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists visits for a flat, newest entry first
    pub async fn list_for_flat(pool: &PgPool, flat_number: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Visitor>(
            "SELECT * FROM visitors WHERE flat_number = $1 ORDER BY entry_time DESC",
        )
        .bind(flat_number)
        .fetch_all(pool)
        .await
    }

    /// Lists visitors, optionally only those currently inside
    pub async fn list(
        pool: &PgPool,
        status: Option<VisitorStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, Visitor>(
                    "SELECT * FROM visitors WHERE status = $1 ORDER BY entry_time DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Visitor>("SELECT * FROM visitors ORDER BY entry_time DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Counts visitors currently inside
    pub async fn count_inside(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM visitors WHERE status = 'in'")
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(VisitorStatus::In.as_str(), "in");
        assert_eq!(VisitorStatus::Out.as_str(), "out");
    }
}
