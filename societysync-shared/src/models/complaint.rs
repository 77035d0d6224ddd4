/// Complaint model and status tracking
///
/// Complaints move freely among the four states; no ordering is enforced.
/// `resolved_at` is stamped only when a complaint enters `resolved` and is
/// deliberately left in place if the complaint later moves elsewhere, so
/// the timestamp records the most recent resolution.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE complaints (
///     complaint_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID REFERENCES users(user_id),
///     flat_number VARCHAR(10) NOT NULL,
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL,
///     category VARCHAR(50) NOT NULL,
///     priority VARCHAR(20) NOT NULL DEFAULT 'medium'
///         CHECK (priority IN ('low', 'medium', 'high', 'urgent')),
///     status VARCHAR(20) NOT NULL DEFAULT 'open'
///         CHECK (status IN ('open', 'in_progress', 'resolved', 'closed')),
///     admin_response TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     resolved_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Complaint status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    /// Newly filed, unhandled
    Open,

    /// Being worked on
    InProgress,

    /// Fixed
    Resolved,

    /// Closed without or after resolution
    Closed,
}

impl ComplaintStatus {
    /// Converts status to its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Open => "open",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Closed => "closed",
        }
    }
}

/// Complaint priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComplaintPriority {
    /// Can wait
    Low,

    /// Default
    Medium,

    /// Should be handled soon
    High,

    /// Drop everything
    Urgent,
}

impl ComplaintPriority {
    /// Converts priority to its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintPriority::Low => "low",
            ComplaintPriority::Medium => "medium",
            ComplaintPriority::High => "high",
            ComplaintPriority::Urgent => "urgent",
        }
    }
}

/// Complaint model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Complaint {
    /// Unique complaint ID
    pub complaint_id: Uuid,

    /// Resident who filed it
    pub user_id: Option<Uuid>,

    /// Flat it concerns
    pub flat_number: String,

    /// Short summary
    pub title: String,

    /// Full description
    pub description: String,

    /// Category (e.g. "Plumbing", "Electrical", "Noise")
    pub category: String,

    /// Priority level
    pub priority: ComplaintPriority,

    /// Current status
    pub status: ComplaintStatus,

    /// Admin's response text, if any
    pub admin_response: Option<String>,

    /// When the complaint was filed
    pub created_at: DateTime<Utc>,

    /// When the complaint was last touched
    pub updated_at: DateTime<Utc>,

    /// When the complaint last entered resolved (preserved on reopen)
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Input for filing a new complaint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComplaint {
    /// Resident filing the complaint
    pub user_id: Uuid,

    /// Flat it concerns
    pub flat_number: String,

    /// Short summary
    pub title: String,

    /// Full description
    pub description: String,

    /// Category
    pub category: String,

    /// Priority level
    pub priority: ComplaintPriority,
}

/// Per-status complaint counts for dashboards
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ComplaintStatusCount {
    /// Status value
    pub status: ComplaintStatus,

    /// Number of complaints in that status
    pub count: i64,
}

impl Complaint {
    /// Files a new complaint in open status
    pub async fn create(pool: &PgPool, data: CreateComplaint) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Complaint>(
            r#"
            INSERT INTO complaints (user_id, flat_number, title, description, category, priority)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(&data.flat_number)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.priority)
        .fetch_one(pool)
        .await
    }

    /// Finds a complaint by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Complaint>("SELECT * FROM complaints WHERE complaint_id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists a resident's complaints, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Complaint>(
            "SELECT * FROM complaints WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Lists complaints, optionally filtered by status, newest first
    pub async fn list(
        pool: &PgPool,
        status: Option<ComplaintStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, Complaint>(
                    "SELECT * FROM complaints WHERE status = $1 ORDER BY created_at DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Complaint>("SELECT * FROM complaints ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Updates a complaint's status
    ///
    /// Any status may move to any other. `resolved_at` is stamped only on
    /// the transition into resolved and kept as-is otherwise.
    ///
    /// Returns the updated complaint, or `None` if it doesn't exist.
    pub async fn update_status(
        pool: &PgPool,
        complaint_id: Uuid,
        new_status: ComplaintStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Complaint>(
            r#"
            UPDATE complaints
            SET status = $2,
                updated_at = NOW(),
                resolved_at = CASE WHEN $2 = 'resolved' THEN NOW() ELSE resolved_at END
            WHERE complaint_id = $1
            RETURNING *
            "#,
        )
        .bind(complaint_id)
        .bind(new_status)
        .fetch_optional(pool)
        .await
    }

    /// Attaches or replaces the admin's response
    ///
    /// Independent of status transitions; overwrites any prior response.
    pub async fn attach_admin_response(
        pool: &PgPool,
        complaint_id: Uuid,
        response: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Complaint>(
            r#"
            UPDATE complaints
            SET admin_response = $2, updated_at = NOW()
            WHERE complaint_id = $1
            RETURNING *
            "#,
        )
        .bind(complaint_id)
        .bind(response)
        .fetch_optional(pool)
        .await
    }

    /// Counts complaints that still need attention (open or in progress)
    pub async fn count_unresolved(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM complaints WHERE status IN ('open', 'in_progress')",
        )
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Per-status complaint counts
    pub async fn status_breakdown(pool: &PgPool) -> Result<Vec<ComplaintStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, ComplaintStatusCount>(
            "SELECT status, COUNT(*) AS count FROM complaints GROUP BY status",
        )
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(ComplaintStatus::Open.as_str(), "open");
        assert_eq!(ComplaintStatus::InProgress.as_str(), "in_progress");
        assert_eq!(ComplaintStatus::Resolved.as_str(), "resolved");
        assert_eq!(ComplaintStatus::Closed.as_str(), "closed");
    }

    #[test]
    fn test_priority_as_str() {
        assert_eq!(ComplaintPriority::Low.as_str(), "low");
        assert_eq!(ComplaintPriority::Medium.as_str(), "medium");
        assert_eq!(ComplaintPriority::High.as_str(), "high");
        assert_eq!(ComplaintPriority::Urgent.as_str(), "urgent");
    }

    #[test]
    fn test_status_serde_matches_check_constraint() {
        // The JSON wire values must match the CHECK constraint strings
        let json = serde_json::to_string(&ComplaintStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let back: ComplaintStatus = serde_json::from_str("\"resolved\"").unwrap();
        assert_eq!(back, ComplaintStatus::Resolved);
    }
}
