/// Authentication and credential utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`credentials`]: Username and initial-password issuing for new residents
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Request-scoped authentication context for Axum
///
/// # Security Notes
///
/// - Passwords are stored as Argon2id hashes
/// - JWT tokens are HS256-signed with configurable expiration
/// - The plaintext initial password issued at account creation is kept for
///   admin recovery and must only ever be exposed on admin-role routes

pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;
