/// Visitor log endpoints
///
/// Residents log visitors for their own flat; the admin can log for any
/// flat and sees the whole register. The entry/exit transition is one-way.
///
/// # Endpoints
///
/// - `POST /v1/visitors` - Log a visitor entering
/// - `POST /v1/visitors/:id/exit` - Log a visitor leaving
/// - `GET  /v1/visitors` - Visitor register (own flat for residents,
///   everything for the admin; optional `?status=` filter)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use societysync_shared::{
    auth::middleware::AuthContext,
    models::{
        user::User,
        visitor::{CreateVisitor, Visitor, VisitorStatus},
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Log entry request
#[derive(Debug, Deserialize, Validate)]
pub struct LogEntryRequest {
    /// Flat being visited; residents may only name their own flat, so the
    /// field is optional for them and defaults to it
    pub flat_number: Option<String>,

    /// Visitor's name
    #[validate(length(min = 1, max = 100, message = "Visitor name must be 1-100 characters"))]
    pub visitor_name: String,

    /// Visitor's phone number
    #[validate(length(max = 15, message = "Phone must be at most 15 characters"))]
    pub visitor_phone: Option<String>,

    /// Purpose of the visit
    pub purpose: Option<String>,

    /// Vehicle registration, if any
    pub vehicle_number: Option<String>,
}

/// List visitors query parameters
#[derive(Debug, Deserialize)]
pub struct ListVisitorsQuery {
    /// Filter to visitors currently inside or already gone
    pub status: Option<VisitorStatus>,
}

/// Log entry endpoint
///
/// Records the visitor as inside with the entry time set now. Residents
/// log against their own flat; the admin must name the flat explicitly.
pub async fn log_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<LogEntryRequest>,
) -> ApiResult<Json<Visitor>> {
    req.validate().map_err(ApiError::from_validation)?;

    let flat_number = if auth.is_admin() {
        req.flat_number
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Flat number is required".to_string()))?
    } else {
        let user = User::find_by_id(&state.db, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let own_flat = user
            .flat_number
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ApiError::Forbidden("Account has no flat assigned".to_string()))?;

        // A resident may not log visitors for another flat
        if let Some(ref requested) = req.flat_number {
            if *requested != own_flat {
                return Err(ApiError::Forbidden(
                    "Visitors can only be logged for your own flat".to_string(),
                ));
            }
        }

        own_flat
    };

    let visitor = Visitor::log_entry(
        &state.db,
        CreateVisitor {
            flat_number,
            visitor_name: req.visitor_name,
            visitor_phone: req.visitor_phone,
            purpose: req.purpose,
            vehicle_number: req.vehicle_number,
            logged_by: Some(auth.user_id),
        },
    )
    .await?;

    Ok(Json(visitor))
}

/// Log exit endpoint
///
/// Stamps the exit time and flips status to out. One-way: a second exit
/// for the same visit is a conflict.
///
/// # Errors
///
/// - `404 Not Found`: No such visit
/// - `409 Conflict`: Visitor already logged out
pub async fn log_exit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(visitor_id): Path<Uuid>,
) -> ApiResult<Json<Visitor>> {
    let visit = Visitor::find_by_id(&state.db, visitor_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Visitor record not found".to_string()))?;

    if !auth.is_admin() {
        let user = User::find_by_id(&state.db, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if user.flat_number.as_deref() != Some(visit.flat_number.as_str()) {
            return Err(ApiError::Forbidden(
                "Visitor belongs to another flat".to_string(),
            ));
        }
    }

    let updated = Visitor::log_exit(&state.db, visitor_id)
        .await?
        .ok_or_else(|| ApiError::Conflict("Visitor has already left".to_string()))?;

    Ok(Json(updated))
}

/// Visitor register endpoint
///
/// The admin sees every visit; residents see their own flat's register.
pub async fn list_visitors(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListVisitorsQuery>,
) -> ApiResult<Json<Vec<Visitor>>> {
    if auth.is_admin() {
        let visitors = Visitor::list(&state.db, query.status).await?;
        return Ok(Json(visitors));
    }

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let flat_number = user
        .flat_number
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::Forbidden("Account has no flat assigned".to_string()))?;

    let mut visitors = Visitor::list_for_flat(&state.db, &flat_number).await?;
    if let Some(status) = query.status {
        visitors.retain(|v| v.status == status);
    }

    Ok(Json(visitors))
}
