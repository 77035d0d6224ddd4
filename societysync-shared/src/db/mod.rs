/// Database layer for SocietySync
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Database migration runner
/// - `catalog`: Allow-listed raw table browsing for the admin console

pub mod catalog;
pub mod migrations;
pub mod pool;
