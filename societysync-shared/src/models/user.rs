/// User model, credential issuing, and authentication
///
/// A user is one of three roles. Owners and tenants carry a role-specific
/// profile row (see the `owner` and `tenant` models) created in the same
/// transaction as the user itself, so a failed profile insert never leaves
/// a bare user behind.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     user_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(50) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role VARCHAR(20) NOT NULL CHECK (role IN ('admin', 'owner', 'tenant')),
///     flat_number VARCHAR(10),
///     name VARCHAR(100) NOT NULL,
///     email VARCHAR(100),
///     phone VARCHAR(15),
///     profile_picture TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login TIMESTAMPTZ,
///     password_changed BOOLEAN NOT NULL DEFAULT FALSE,
///     initial_password VARCHAR(50)
/// );
/// ```
///
/// The `initial_password` column holds the plaintext credential issued at
/// creation so the admin can recover it for a locked-out resident. It is a
/// known weakness of the small-society design: treat it as sensitive and
/// serialize it only on admin-role endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::credentials::{generate_password, generate_username, DEFAULT_PASSWORD_LENGTH};
use crate::auth::password::{hash_password, verify_password, PasswordError};

/// User role
///
/// Role-specific behavior is dispatched by exhaustive matching on this
/// enum, never by comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Society administrator
    Admin,

    /// Flat owner
    Owner,

    /// Tenant renting from an owner
    Tenant,
}

impl Role {
    /// Converts role to its database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Tenant => "tenant",
        }
    }
}

/// Error type for user creation and authentication
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Password hashing or verification failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// User model representing an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub user_id: Uuid,

    /// Login username, issued by the system (e.g. "owner_jane_doe")
    pub username: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account role
    pub role: Role,

    /// Flat this user lives in ("ADMIN" sentinel for the administrator)
    pub flat_number: Option<String>,

    /// Display name
    pub name: String,

    /// Email address
    pub email: Option<String>,

    /// Phone number
    pub phone: Option<String>,

    /// Profile picture URL
    pub profile_picture: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login: Option<DateTime<Utc>>,

    /// Whether the user has replaced their issued initial password
    pub password_changed: bool,

    /// Plaintext initial credential, kept for admin recovery.
    /// Never serialized in API responses; admin routes expose it through
    /// [`IssuedCredentials`] explicitly.
    #[serde(skip_serializing)]
    pub initial_password: Option<String>,
}

/// Owner-specific fields supplied at creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerProfileInput {
    /// When ownership of the flat began
    pub ownership_start_date: Option<NaiveDate>,

    /// Emergency contact number
    pub emergency_contact: Option<String>,
}

/// Tenant-specific fields supplied at creation
///
/// `owner_id` is nullable here at the data layer; the API path requires it
/// and rejects tenant creation without an owner before reaching this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantProfileInput {
    /// Owner this tenant rents from
    pub owner_id: Option<Uuid>,

    /// Monthly rent
    pub rent_amount: Option<Decimal>,

    /// Lease start date
    pub lease_start_date: Option<NaiveDate>,

    /// Lease end date
    pub lease_end_date: Option<NaiveDate>,

    /// Security deposit held
    pub security_deposit: Option<Decimal>,
}

/// Role-specific profile payload for user creation
///
/// The variant must agree with the role being created; `Admin` carries no
/// profile row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "role")]
pub enum RoleProfile {
    /// No extension row
    Admin,

    /// Insert an owners row
    Owner(OwnerProfileInput),

    /// Insert a tenants row
    Tenant(TenantProfileInput),
}

impl RoleProfile {
    /// The role this profile payload belongs to
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Admin => Role::Admin,
            RoleProfile::Owner(_) => Role::Owner,
            RoleProfile::Tenant(_) => Role::Tenant,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: Option<String>,

    /// Phone number
    pub phone: Option<String>,

    /// Flat number
    pub flat_number: Option<String>,

    /// Role and role-specific profile fields
    pub profile: RoleProfile,
}

/// Credentials issued for a freshly created user
///
/// Contains the plaintext initial password; only admin-role endpoints may
/// return this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedCredentials {
    /// New user's ID
    pub user_id: Uuid,

    /// Issued username
    pub username: String,

    /// Issued plaintext initial password
    pub initial_password: String,
}

impl User {
    /// Creates a user together with its role-specific profile row
    ///
    /// Issues a unique username and a random initial password, stores the
    /// Argon2id hash plus the plaintext initial credential, and inserts the
    /// owners/tenants extension row. Everything happens in one transaction:
    /// if the profile insert fails, the user insert is rolled back.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails, the username loses the documented
    /// creation race (unique violation), or any insert fails.
    pub async fn create_with_profile(
        pool: &PgPool,
        data: CreateUser,
    ) -> Result<IssuedCredentials, UserError> {
        let role = data.profile.role();
        let username = generate_username(pool, role, &data.name).await?;
        let initial_password = generate_password(DEFAULT_PASSWORD_LENGTH);
        let password_hash = hash_password(&initial_password)?;

        let mut tx = pool.begin().await?;

        let (user_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO users (username, password_hash, role, flat_number, name, email, phone, initial_password)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING user_id
            "#,
        )
        .bind(&username)
        .bind(&password_hash)
        .bind(role)
        .bind(&data.flat_number)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&initial_password)
        .fetch_one(&mut *tx)
        .await?;

        match data.profile {
            RoleProfile::Admin => {}
            RoleProfile::Owner(owner) => {
                sqlx::query(
                    r#"
                    INSERT INTO owners (user_id, flat_number, ownership_start_date, emergency_contact)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(user_id)
                .bind(data.flat_number.as_deref().unwrap_or_default())
                .bind(owner.ownership_start_date)
                .bind(&owner.emergency_contact)
                .execute(&mut *tx)
                .await?;
            }
            RoleProfile::Tenant(tenant) => {
                sqlx::query(
                    r#"
                    INSERT INTO tenants (user_id, owner_id, flat_number, rent_amount,
                                         lease_start_date, lease_end_date, security_deposit)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(user_id)
                .bind(tenant.owner_id)
                .bind(data.flat_number.as_deref().unwrap_or_default())
                .bind(tenant.rent_amount)
                .bind(tenant.lease_start_date)
                .bind(tenant.lease_end_date)
                .bind(tenant.security_deposit)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        Ok(IssuedCredentials {
            user_id,
            username,
            initial_password,
        })
    }

    /// Authenticates a user by username and password
    ///
    /// On success bumps `last_login` and returns the full user record; the
    /// caller inspects `password_changed` to force the initial
    /// password-change flow. Unknown username or wrong password both return
    /// `None` rather than an error.
    pub async fn authenticate(
        pool: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<Option<Self>, UserError> {
        let Some(user) = Self::find_by_username(pool, username).await? else {
            return Ok(None);
        };

        if !verify_password(password, &user.password_hash)? {
            return Ok(None);
        }

        sqlx::query("UPDATE users SET last_login = NOW() WHERE user_id = $1")
            .bind(user.user_id)
            .execute(pool)
            .await?;

        Ok(Some(user))
    }

    /// Replaces a user's password with one of their own choosing
    ///
    /// Sets `password_changed = TRUE` unconditionally; the initial password
    /// column is left as the historical record of what was issued.
    pub async fn change_password(
        pool: &PgPool,
        user_id: Uuid,
        new_password: &str,
    ) -> Result<bool, UserError> {
        let password_hash = hash_password(new_password)?;

        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, password_changed = TRUE WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(&password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Lists users, optionally filtered by role, newest first
    pub async fn list(pool: &PgPool, role: Option<Role>) -> Result<Vec<Self>, sqlx::Error> {
        match role {
            Some(role) => {
                sqlx::query_as::<_, User>(
                    "SELECT * FROM users WHERE role = $1 ORDER BY created_at DESC",
                )
                .bind(role)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Counts users with a given role
    pub async fn count_by_role(pool: &PgPool, role: Role) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Creates the bootstrap admin account if no admin exists
    ///
    /// Runs at startup. The default `admin` / `admin123` pair exists so the
    /// first login is possible; both are overridable through configuration.
    /// Returns `true` if an admin was created.
    pub async fn ensure_default_admin(
        pool: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<bool, UserError> {
        let existing = Self::count_by_role(pool, Role::Admin).await?;
        if existing > 0 {
            return Ok(false);
        }

        let password_hash = hash_password(password)?;

        sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, name, email, flat_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .bind(Role::Admin)
        .bind("System Administrator")
        .bind("admin@societysync.local")
        .bind("ADMIN")
        .execute(pool)
        .await?;

        tracing::info!(username, "Bootstrap admin account created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Owner.as_str(), "owner");
        assert_eq!(Role::Tenant.as_str(), "tenant");
    }

    #[test]
    fn test_role_profile_role() {
        assert_eq!(RoleProfile::Admin.role(), Role::Admin);
        assert_eq!(
            RoleProfile::Owner(OwnerProfileInput {
                ownership_start_date: None,
                emergency_contact: None,
            })
            .role(),
            Role::Owner
        );
        assert_eq!(
            RoleProfile::Tenant(TenantProfileInput {
                owner_id: None,
                rent_amount: None,
                lease_start_date: None,
                lease_end_date: None,
                security_deposit: None,
            })
            .role(),
            Role::Tenant
        );
    }

    #[test]
    fn test_sensitive_fields_not_serialized() {
        let user = User {
            user_id: Uuid::new_v4(),
            username: "owner_jane_doe".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::Owner,
            flat_number: Some("A101".to_string()),
            name: "Jane Doe".to_string(),
            email: None,
            phone: None,
            profile_picture: None,
            created_at: Utc::now(),
            last_login: None,
            password_changed: false,
            initial_password: Some("aB3dE9xY".to_string()),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("initial_password"));
        assert!(json.contains("owner_jane_doe"));
    }
}
