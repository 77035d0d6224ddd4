/// Complaint endpoints
///
/// Residents file complaints against their own flat; the admin works the
/// queue, moving complaints between states and attaching a response.
///
/// # Endpoints
///
/// - `POST /v1/complaints` - File a complaint
/// - `GET  /v1/complaints` - Resident's own complaints
/// - `GET  /v1/admin/complaints` - All complaints (optional `?status=`)
/// - `PUT  /v1/admin/complaints/:id/status` - Move to a new status
/// - `PUT  /v1/admin/complaints/:id/response` - Attach/replace response

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
        complaint::{Complaint, ComplaintPriority, ComplaintStatus, CreateComplaint},
        user::User,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// File complaint request
#[derive(Debug, Deserialize, Validate)]
pub struct FileComplaintRequest {
    /// Short summary
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Full description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Category (e.g. "Plumbing", "Electrical", "Noise")
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: String,

    /// Priority level
    pub priority: ComplaintPriority,
}

/// Update status request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status
    pub status: ComplaintStatus,
}

/// Attach response request
#[derive(Debug, Deserialize, Validate)]
pub struct RespondRequest {
    /// Response text shown to the resident
    #[validate(length(min = 1, message = "Response is required"))]
    pub response: String,
}

/// List complaints query parameters
#[derive(Debug, Deserialize)]
pub struct ListComplaintsQuery {
    /// Filter to one status
    pub status: Option<ComplaintStatus>,
}

/// File complaint endpoint
///
/// The complaint is recorded against the caller's own flat; the flat cannot
/// be chosen in the request.
pub async fn file_complaint(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<FileComplaintRequest>,
) -> ApiResult<Json<Complaint>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let flat_number = user
        .flat_number
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::Forbidden("Account has no flat assigned".to_string()))?;

    let complaint = Complaint::create(
        &state.db,
        CreateComplaint {
            user_id: auth.user_id,
            flat_number,
            title: req.title,
            description: req.description,
            category: req.category,
            priority: req.priority,
        },
    )
    .await?;

    Ok(Json(complaint))
}

/// Resident complaint listing
pub async fn list_my_complaints(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Complaint>>> {
    let complaints = Complaint::list_for_user(&state.db, auth.user_id).await?;
    Ok(Json(complaints))
}

/// List complaints endpoint (admin)
pub async fn list_complaints(
    State(state): State<AppState>,
    Query(query): Query<ListComplaintsQuery>,
) -> ApiResult<Json<Vec<Complaint>>> {
    let complaints = Complaint::list(&state.db, query.status).await?;
    Ok(Json(complaints))
}

/// Update status endpoint (admin)
///
/// Any status may move to any other. Entering resolved stamps the
/// resolution time; leaving it again does not clear the stamp.
///
/// # Errors
///
/// - `404 Not Found`: No such complaint
pub async fn update_status(
    State(state): State<AppState>,
    Path(complaint_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Complaint>> {
    let complaint = Complaint::update_status(&state.db, complaint_id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Complaint not found".to_string()))?;

    Ok(Json(complaint))
}

/// Attach response endpoint (admin)
///
/// Overwrites any prior response; independent of status transitions.
///
/// # Errors
///
/// - `404 Not Found`: No such complaint
pub async fn respond(
    State(state): State<AppState>,
    Path(complaint_id): Path<Uuid>,
    Json(req): Json<RespondRequest>,
) -> ApiResult<Json<Complaint>> {
    req.validate().map_err(ApiError::from_validation)?;

    let complaint = Complaint::attach_admin_response(&state.db, complaint_id, &req.response)
        .await?
        .ok_or_else(|| ApiError::NotFound("Complaint not found".to_string()))?;

    Ok(Json(complaint))
}
