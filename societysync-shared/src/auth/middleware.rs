/// Request-scoped authentication context for Axum
///
/// After the JWT middleware in the API crate validates a bearer token, it
/// inserts an [`AuthContext`] into the request extensions. Handlers extract
/// it with Axum's `Extension` extractor; there is no global session state
/// and no cross-request mutable flags.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use societysync_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}, role: {:?}", auth.user_id, auth.role)
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Role the session was opened under
    pub role: Role,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_claims(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether this context belongs to the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this context belongs to a resident (owner or tenant)
    ///
    /// Owners and tenants share the resident capability set; the role only
    /// changes which extra panels the client renders.
    pub fn is_resident(&self) -> bool {
        matches!(self.role, Role::Owner | Role::Tenant)
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credentials provided
    #[error("Missing credentials")]
    MissingCredentials,

    /// Credentials have invalid format
    #[error("Invalid credential format: {0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Caller lacks the required role
    #[error("Requires {required} role")]
    RoleRequired { required: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_predicates() {
        let admin = AuthContext::from_claims(Uuid::new_v4(), Role::Admin);
        assert!(admin.is_admin());
        assert!(!admin.is_resident());

        let owner = AuthContext::from_claims(Uuid::new_v4(), Role::Owner);
        assert!(!owner.is_admin());
        assert!(owner.is_resident());

        let tenant = AuthContext::from_claims(Uuid::new_v4(), Role::Tenant);
        assert!(tenant.is_resident());
    }
}
