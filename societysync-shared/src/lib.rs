//! # SocietySync Shared Library
//!
//! Shared types, database access, and business logic used by the
//! SocietySync API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their operations (users, bills,
//!   complaints, visitors, notifications, polls)
//! - `auth`: Credential issuing, password hashing, JWT tokens, and the
//!   request authentication context
//! - `db`: Connection pool, migrations, and the allow-listed table catalog

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the SocietySync shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
