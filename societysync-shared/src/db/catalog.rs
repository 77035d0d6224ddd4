/// Allow-listed raw table browsing for the admin console
///
/// The admin console exposes a read-only view over the raw tables. Table
/// names are never taken from user input directly: a request is matched
/// against the static allow-list below and only the matched `&'static str`
/// is ever interpolated into query text. Unknown names are rejected before
/// any query is built.

use serde_json::Value as JsonValue;
use sqlx::PgPool;

/// Tables the admin console may browse
///
/// Must stay in sync with the schema migration; nothing outside this list
/// is reachable through [`browse`].
pub const BROWSABLE_TABLES: [&str; 11] = [
    "users",
    "owners",
    "tenants",
    "bills",
    "complaints",
    "visitors",
    "notifications",
    "notification_reads",
    "polls",
    "poll_options",
    "votes",
];

/// Maximum rows a single browse request may return
pub const MAX_BROWSE_ROWS: i64 = 500;

/// Error type for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Requested table is not in the allow-list
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Resolves a requested table name against the allow-list
///
/// Returns the static allow-listed name, which is the only string that may
/// be spliced into SQL text.
pub fn resolve_table(requested: &str) -> Result<&'static str, CatalogError> {
    BROWSABLE_TABLES
        .iter()
        .find(|t| **t == requested)
        .copied()
        .ok_or_else(|| CatalogError::UnknownTable(requested.to_string()))
}

/// Returns up to `limit` rows of an allow-listed table as JSON
///
/// # Errors
///
/// Returns [`CatalogError::UnknownTable`] for names outside the allow-list,
/// or a database error if the query fails.
pub async fn browse(pool: &PgPool, table: &str, limit: i64) -> Result<JsonValue, CatalogError> {
    let table = resolve_table(table)?;
    let limit = limit.clamp(1, MAX_BROWSE_ROWS);

    // `table` is a static allow-listed identifier; `limit` is bound.
    let sql = format!(
        "SELECT COALESCE(jsonb_agg(row_to_json(t)), '[]'::jsonb) \
         FROM (SELECT * FROM {} LIMIT $1) t",
        table
    );

    let rows: JsonValue = sqlx::query_scalar(&sql).bind(limit).fetch_one(pool).await?;

    Ok(rows)
}

/// Returns the row count of an allow-listed table
pub async fn count_rows(pool: &PgPool, table: &str) -> Result<i64, CatalogError> {
    let table = resolve_table(table)?;

    let sql = format!("SELECT COUNT(*) FROM {}", table);
    let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(pool).await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_table() {
        assert_eq!(resolve_table("bills").unwrap(), "bills");
        assert_eq!(resolve_table("votes").unwrap(), "votes");
    }

    #[test]
    fn test_resolve_rejects_unknown_table() {
        let err = resolve_table("pg_shadow").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownTable(_)));
    }

    #[test]
    fn test_resolve_rejects_injection_attempts() {
        assert!(resolve_table("bills; DROP TABLE bills").is_err());
        assert!(resolve_table("bills--").is_err());
        assert!(resolve_table("").is_err());
        // Exact match only, no case folding
        assert!(resolve_table("Bills").is_err());
    }

    #[test]
    fn test_allow_list_covers_schema() {
        assert_eq!(BROWSABLE_TABLES.len(), 11);
    }
}
