/// Notification endpoints
///
/// The admin broadcasts; every user sees every notification and tracks
/// their own read state. Notifications are immutable after creation.
///
/// # Endpoints
///
/// - `GET  /v1/notifications` - All notifications, newest first
/// - `GET  /v1/notifications/unread` - Caller's unread notifications
/// - `GET  /v1/notifications/unread/count` - Unread badge count
/// - `POST /v1/notifications/:id/read` - Mark one read (idempotent)
/// - `POST /v1/admin/notifications` - Broadcast

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use societysync_shared::{
    auth::middleware::AuthContext,
    models::notification::{CreateNotification, Notification, NotificationPriority},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Broadcast request
#[derive(Debug, Deserialize, Validate)]
pub struct BroadcastRequest {
    /// Headline
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Body text
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,

    /// Priority level
    pub priority: NotificationPriority,
}

/// Unread count response
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    /// Number of notifications the caller has not read
    pub unread: i64,
}

/// Mark read response
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    /// Whether this call recorded the read (false if already read)
    pub newly_read: bool,
}

/// Broadcast endpoint (admin)
pub async fn broadcast(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<BroadcastRequest>,
) -> ApiResult<Json<Notification>> {
    req.validate().map_err(ApiError::from_validation)?;

    let notification = Notification::broadcast(
        &state.db,
        CreateNotification {
            title: req.title,
            message: req.message,
            priority: req.priority,
            created_by: Some(auth.user_id),
        },
    )
    .await?;

    Ok(Json(notification))
}

/// Full notification listing
pub async fn list_all(State(state): State<AppState>) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = Notification::list(&state.db).await?;
    Ok(Json(notifications))
}

/// Unread notification listing for the caller
pub async fn list_unread(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = Notification::unread_for(&state.db, auth.user_id).await?;
    Ok(Json(notifications))
}

/// Unread badge count for the caller
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UnreadCountResponse>> {
    let unread = Notification::unread_count(&state.db, auth.user_id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// Mark read endpoint
///
/// Idempotent: marking an already-read notification changes nothing and
/// preserves the original read time.
///
/// # Errors
///
/// - `404 Not Found`: No such notification
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(notification_id): Path<Uuid>,
) -> ApiResult<Json<MarkReadResponse>> {
    // Distinguish "unknown notification" from "already read"
    Notification::find_by_id(&state.db, notification_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    let newly_read = Notification::mark_read(&state.db, notification_id, auth.user_id).await?;

    Ok(Json(MarkReadResponse { newly_read }))
}
