/// Owner profile model
///
/// A 1:1 extension of a user with role `owner`. Holds the ownership start
/// date and emergency contact; tenants reference their owner through
/// `owner_id`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Owner profile row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Owner {
    /// Unique owner profile ID
    pub owner_id: Uuid,

    /// User this profile extends
    pub user_id: Uuid,

    /// Flat the owner holds
    pub flat_number: String,

    /// When ownership began
    pub ownership_start_date: Option<NaiveDate>,

    /// Emergency contact number
    pub emergency_contact: Option<String>,

    /// When the profile was created
    pub created_at: DateTime<Utc>,
}

/// Owner summary used to populate tenant-creation choices
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OwnerSummary {
    /// Owner profile ID
    pub owner_id: Uuid,

    /// Owner's display name
    pub name: String,

    /// Flat the owner holds
    pub flat_number: String,
}

impl Owner {
    /// Finds an owner profile by its ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Owner>("SELECT * FROM owners WHERE owner_id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds the owner profile belonging to a user
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Owner>("SELECT * FROM owners WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists all owners with their names, for tenant assignment
    pub async fn list_summaries(pool: &PgPool) -> Result<Vec<OwnerSummary>, sqlx::Error> {
        sqlx::query_as::<_, OwnerSummary>(
            r#"
            SELECT o.owner_id, u.name, o.flat_number
            FROM owners o
            JOIN users u ON o.user_id = u.user_id
            ORDER BY o.flat_number
            "#,
        )
        .fetch_all(pool)
        .await
    }
}
