/// Account management endpoints
///
/// The admin creates every account; the system issues the username and a
/// random initial password and hands them back exactly once at creation.
/// The issued password can later be recovered through the credentials
/// endpoint for locked-out residents. Owners additionally get a view of
/// the tenants renting from them.
///
/// # Endpoints
///
/// - `GET  /v1/tenants` - Tenants renting from the calling owner
/// - `POST /v1/admin/users` - Create an account, returns issued credentials
/// - `GET  /v1/admin/users` - List accounts (optional `?role=` filter)
/// - `GET  /v1/admin/users/:id/credentials` - Recover issued credentials
/// - `GET  /v1/admin/owners` - Owner summaries for tenant assignment

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use societysync_shared::{
    auth::middleware::AuthContext,
    models::{
        owner::{Owner, OwnerSummary},
        tenant::{lease_window_is_valid, Tenant},
        user::{CreateUser, IssuedCredentials, Role, RoleProfile, User},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create user request
///
/// The `profile` field is tagged by role and carries the role-specific
/// fields; `Admin` carries none.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Display name, also the seed for the issued username
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Phone number
    #[validate(length(max = 15, message = "Phone must be at most 15 characters"))]
    pub phone: Option<String>,

    /// Flat number (required for owners and tenants)
    #[validate(length(max = 10, message = "Flat number must be at most 10 characters"))]
    pub flat_number: Option<String>,

    /// Role and role-specific profile fields
    pub profile: RoleProfile,
}

/// List users query parameters
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Filter to one role
    pub role: Option<Role>,
}

/// Issued credentials recovered for an existing account
#[derive(Debug, Serialize)]
pub struct CredentialsResponse {
    /// User ID
    pub user_id: Uuid,

    /// Issued username
    pub username: String,

    /// Issued plaintext initial password, if still on record
    pub initial_password: Option<String>,

    /// Whether the user has since chosen their own password (if so, the
    /// initial password no longer opens the account)
    pub password_changed: bool,
}

/// Create user endpoint
///
/// Issues a username derived from role and name (with a numeric suffix on
/// collision) and a random 8-character password, hashes the password, and
/// creates the account plus its role-specific profile row in one
/// transaction. The plaintext initial password is returned here and only
/// here outside the credentials recovery endpoint.
///
/// # Endpoint
///
/// ```text
/// POST /v1/admin/users
/// Content-Type: application/json
///
/// {
///   "name": "Jane Doe",
///   "email": "jane@example.com",
///   "flat_number": "A101",
///   "profile": { "role": "owner", "ownership_start_date": "2024-01-01" }
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username creation race lost
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<IssuedCredentials>> {
    req.validate().map_err(ApiError::from_validation)?;

    let mut errors = Vec::new();

    // Owners and tenants must live somewhere
    if !matches!(req.profile, RoleProfile::Admin)
        && req.flat_number.as_deref().unwrap_or("").trim().is_empty()
    {
        errors.push(ValidationErrorDetail {
            field: "flat_number".to_string(),
            message: "Flat number is required for owners and tenants".to_string(),
        });
    }

    if let RoleProfile::Tenant(ref tenant) = req.profile {
        if tenant.owner_id.is_none() {
            errors.push(ValidationErrorDetail {
                field: "owner_id".to_string(),
                message: "Tenant must be assigned to an owner".to_string(),
            });
        }

        if !lease_window_is_valid(tenant.lease_start_date, tenant.lease_end_date) {
            errors.push(ValidationErrorDetail {
                field: "lease_end_date".to_string(),
                message: "Lease end date must not be before the start date".to_string(),
            });
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::ValidationError(errors));
    }

    // A tenant's owner must actually exist before the account is created
    if let RoleProfile::Tenant(ref tenant) = req.profile {
        if let Some(owner_id) = tenant.owner_id {
            Owner::find_by_id(&state.db, owner_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Owner not found".to_string()))?;
        }
    }

    let credentials = User::create_with_profile(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            phone: req.phone,
            flat_number: req.flat_number,
            profile: req.profile,
        },
    )
    .await?;

    tracing::info!(
        username = %credentials.username,
        "Account created with issued credentials"
    );

    Ok(Json(credentials))
}

/// List users endpoint
///
/// Lists all accounts, optionally filtered by role. Password hash and
/// initial password are never serialized.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let users = User::list(&state.db, query.role).await?;
    Ok(Json(users))
}

/// Credential recovery endpoint
///
/// Returns the issued username and plaintext initial password for an
/// account. This is the deliberate recovery path for a small society where
/// the admin hands credentials over in person; the response is restricted
/// to the admin role by the route guard.
///
/// # Errors
///
/// - `404 Not Found`: No such user
pub async fn credentials(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<CredentialsResponse>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(CredentialsResponse {
        user_id: user.user_id,
        username: user.username,
        initial_password: user.initial_password,
        password_changed: user.password_changed,
    }))
}

/// Owner's tenants endpoint
///
/// Lists the tenant profiles renting from the calling owner.
///
/// # Errors
///
/// - `403 Forbidden`: Caller has no owner profile
pub async fn list_my_tenants(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Tenant>>> {
    let owner = Owner::find_by_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("Account has no owner profile".to_string()))?;

    let tenants = Tenant::list_by_owner(&state.db, owner.owner_id).await?;
    Ok(Json(tenants))
}

/// Owner summaries endpoint
///
/// Lightweight owner list (ID, name, flat) used when assigning a tenant to
/// an owner.
pub async fn list_owners(State(state): State<AppState>) -> ApiResult<Json<Vec<OwnerSummary>>> {
    let owners = Owner::list_summaries(&state.db).await?;
    Ok(Json(owners))
}
