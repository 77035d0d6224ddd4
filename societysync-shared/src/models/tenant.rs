/// Tenant profile model
///
/// A 1:1 extension of a user with role `tenant`. References the owner the
/// tenant rents from and carries the lease window, rent, and deposit.
///
/// `owner_id` is nullable at this layer; the API creation path requires an
/// owner and rejects tenant creation without one before a row is written.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Tenant profile row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    /// Unique tenant profile ID
    pub tenant_id: Uuid,

    /// User this profile extends
    pub user_id: Uuid,

    /// Owner the tenant rents from
    pub owner_id: Option<Uuid>,

    /// Flat being rented
    pub flat_number: String,

    /// Monthly rent
    pub rent_amount: Option<Decimal>,

    /// Lease start date
    pub lease_start_date: Option<NaiveDate>,

    /// Lease end date
    pub lease_end_date: Option<NaiveDate>,

    /// Security deposit held
    pub security_deposit: Option<Decimal>,

    /// When the profile was created
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Finds the tenant profile belonging to a user
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists tenant profiles renting from an owner
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(
            "SELECT * FROM tenants WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }
}

/// Checks a lease window for validity
///
/// A lease ending before it starts is rejected at the API boundary; when
/// either date is absent the window is accepted as open-ended.
pub fn lease_window_is_valid(start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => end >= start,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_lease_window_valid() {
        assert!(lease_window_is_valid(
            Some(d(2025, 1, 1)),
            Some(d(2025, 12, 31))
        ));
        // Single-day lease is allowed
        assert!(lease_window_is_valid(
            Some(d(2025, 1, 1)),
            Some(d(2025, 1, 1))
        ));
    }

    #[test]
    fn test_lease_window_inverted_rejected() {
        assert!(!lease_window_is_valid(
            Some(d(2025, 12, 31)),
            Some(d(2025, 1, 1))
        ));
    }

    #[test]
    fn test_lease_window_open_ended() {
        assert!(lease_window_is_valid(Some(d(2025, 1, 1)), None));
        assert!(lease_window_is_valid(None, Some(d(2025, 1, 1))));
        assert!(lease_window_is_valid(None, None));
    }
}
