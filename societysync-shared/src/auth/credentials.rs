/// Username and initial-password issuing for new residents
///
/// The admin never types credentials: when a user is created, a username is
/// derived from the role and name (`owner_jane_doe`), made unique with a
/// counter suffix on collision, and paired with a random alphanumeric
/// initial password that the admin hands to the resident.
///
/// The existence-check-then-insert sequence is not locked; two concurrent
/// creations of the same name can race to the same candidate. The username
/// UNIQUE constraint catches the loser and the error is surfaced as a
/// conflict rather than retried.

use rand::{rngs::OsRng, Rng};
use sqlx::PgPool;
use std::collections::HashSet;

use crate::models::user::Role;

/// Length of generated initial passwords
pub const DEFAULT_PASSWORD_LENGTH: usize = 8;

const PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Derives the base username for a role and display name
///
/// Lowercases the name and replaces spaces with underscores:
/// `owner_jane_doe` for role `owner` and name `Jane Doe`.
pub fn username_base(role: Role, name: &str) -> String {
    format!("{}_{}", role.as_str(), name.to_lowercase().replace(' ', "_"))
}

/// Picks the first candidate not rejected by `is_taken`
///
/// Tries the base itself, then `base_1`, `base_2`, ... Serialized calls
/// against a consistent taken-set never produce a collision.
pub fn pick_unique<F: FnMut(&str) -> bool>(base: &str, mut is_taken: F) -> String {
    let mut candidate = base.to_string();
    let mut counter = 1u32;

    while is_taken(&candidate) {
        candidate = format!("{}_{}", base, counter);
        counter += 1;
    }

    candidate
}

/// Generates a unique username for a new user
///
/// Fetches the usernames already occupying the candidate prefix and picks
/// the first free one. See the module docs for the concurrency caveat.
///
/// # Errors
///
/// Returns a database error if the existence query fails.
pub async fn generate_username(
    pool: &PgPool,
    role: Role,
    name: &str,
) -> Result<String, sqlx::Error> {
    let base = username_base(role, name);

    let taken: HashSet<String> = sqlx::query_scalar::<_, String>(
        "SELECT username FROM users WHERE username LIKE $1 || '%'",
    )
    .bind(&base)
    .fetch_all(pool)
    .await?
    .into_iter()
    .collect();

    Ok(pick_unique(&base, |candidate| taken.contains(candidate)))
}

/// Generates a cryptographically random alphanumeric password
///
/// # Example
///
/// ```
/// use societysync_shared::auth::credentials::generate_password;
///
/// let password = generate_password(8);
/// assert_eq!(password.len(), 8);
/// assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_password(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..PASSWORD_ALPHABET.len());
            PASSWORD_ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_base() {
        assert_eq!(username_base(Role::Owner, "Jane Doe"), "owner_jane_doe");
        assert_eq!(username_base(Role::Tenant, "Bob"), "tenant_bob");
        assert_eq!(
            username_base(Role::Admin, "System Administrator"),
            "admin_system_administrator"
        );
    }

    #[test]
    fn test_pick_unique_no_collision() {
        let taken: HashSet<&str> = HashSet::new();
        assert_eq!(
            pick_unique("owner_jane", |c| taken.contains(c)),
            "owner_jane"
        );
    }

    #[test]
    fn test_pick_unique_appends_counter() {
        let taken: HashSet<&str> = ["owner_jane", "owner_jane_1"].into_iter().collect();
        assert_eq!(
            pick_unique("owner_jane", |c| taken.contains(c)),
            "owner_jane_2"
        );
    }

    #[test]
    fn test_serialized_generation_never_collides() {
        // Simulates serialized create_user calls all issuing the same name
        let mut taken: HashSet<String> = HashSet::new();
        for _ in 0..50 {
            let username = pick_unique("tenant_amit", |c| taken.contains(c));
            assert!(taken.insert(username));
        }
        assert_eq!(taken.len(), 50);
    }

    #[test]
    fn test_generate_password_length_and_alphabet() {
        for len in [8, 12, 20] {
            let password = generate_password(len);
            assert_eq!(password.len(), len);
            assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generate_password_is_random() {
        let a = generate_password(16);
        let b = generate_password(16);
        assert_ne!(a, b);
    }
}
