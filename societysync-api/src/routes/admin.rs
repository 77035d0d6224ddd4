/// Admin dashboard and table browser endpoints
///
/// # Endpoints
///
/// - `GET /v1/admin/stats` - Society-wide dashboard statistics
/// - `GET /v1/admin/tables` - Browsable table names
/// - `GET /v1/admin/tables/:name` - Rows from one table

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use societysync_shared::{
    db::catalog::{self, BROWSABLE_TABLES, MAX_BROWSE_ROWS},
    models::stats::SocietyStats,
};
use serde::{Deserialize, Serialize};

/// Browse query parameters
#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    /// Maximum rows to return (clamped server-side)
    pub limit: Option<i64>,
}

/// Table browser listing response
#[derive(Debug, Serialize)]
pub struct TablesResponse {
    /// Names accepted by the browse endpoint
    pub tables: Vec<&'static str>,
}

/// Browse response
#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    /// Table being browsed
    pub table: String,

    /// Total rows in the table
    pub total_rows: i64,

    /// Rows as JSON objects, up to the limit
    pub rows: serde_json::Value,
}

/// Dashboard statistics endpoint
pub async fn society_stats(State(state): State<AppState>) -> ApiResult<Json<SocietyStats>> {
    let stats = SocietyStats::load(&state.db).await?;
    Ok(Json(stats))
}

/// Browsable table listing
pub async fn list_tables() -> Json<TablesResponse> {
    Json(TablesResponse {
        tables: BROWSABLE_TABLES.to_vec(),
    })
}

/// Table browse endpoint
///
/// The table name is resolved against a static allow-list before any SQL
/// is built; an unknown name is a 404, never an identifier in a query.
///
/// # Errors
///
/// - `404 Not Found`: Table not in the allow-list
pub async fn browse_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<BrowseQuery>,
) -> ApiResult<Json<BrowseResponse>> {
    let limit = query.limit.unwrap_or(MAX_BROWSE_ROWS);

    let total_rows = catalog::count_rows(&state.db, &name).await?;
    let rows = catalog::browse(&state.db, &name, limit).await?;

    Ok(Json(BrowseResponse {
        table: name,
        total_rows,
        rows,
    }))
}
