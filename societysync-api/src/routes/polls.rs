/// Poll and voting endpoints
///
/// The admin opens and closes polls; every user gets one vote per poll.
/// Results are visible to everyone at any time.
///
/// # Endpoints
///
/// - `GET  /v1/polls` - Polls with options (optional `?status=` filter)
/// - `POST /v1/polls/:id/vote` - Cast the caller's vote
/// - `GET  /v1/polls/:id/results` - Ranked results
/// - `POST /v1/admin/polls` - Open a poll
/// - `POST /v1/admin/polls/:id/close` - Close a poll

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use societysync_shared::{
    auth::middleware::AuthContext,
    models::poll::{CreatePoll, Poll, PollOption, PollResults, PollStatus, Vote},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create poll request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePollRequest {
    /// Question being polled
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Intended last day of voting
    pub end_date: Option<NaiveDate>,

    /// Option texts; at least 2 distinct non-blank entries
    pub options: Vec<String>,
}

/// Vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    /// Option being voted for
    pub option_id: Uuid,
}

/// List polls query parameters
#[derive(Debug, Deserialize)]
pub struct ListPollsQuery {
    /// Filter to one status
    pub status: Option<PollStatus>,
}

/// A poll with its options and the caller's voting state
#[derive(Debug, Serialize)]
pub struct PollView {
    /// The poll itself
    #[serde(flatten)]
    pub poll: Poll,

    /// Options in creation order
    pub options: Vec<PollOption>,

    /// Whether the caller has already voted
    pub has_voted: bool,
}

/// Create poll endpoint (admin)
///
/// Options are trimmed and deduplicated; fewer than 2 surviving options is
/// a validation error.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Not enough distinct options
pub async fn create_poll(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreatePollRequest>,
) -> ApiResult<Json<PollView>> {
    req.validate().map_err(ApiError::from_validation)?;

    let poll = Poll::create(
        &state.db,
        CreatePoll {
            title: req.title,
            description: req.description,
            end_date: req.end_date,
            options: req.options,
            created_by: Some(auth.user_id),
        },
    )
    .await?;

    let options = Poll::options(&state.db, poll.poll_id).await?;

    Ok(Json(PollView {
        poll,
        options,
        has_voted: false,
    }))
}

/// Poll listing with options and the caller's voting state
pub async fn list_polls(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListPollsQuery>,
) -> ApiResult<Json<Vec<PollView>>> {
    let polls = Poll::list(&state.db, query.status).await?;

    let mut views = Vec::with_capacity(polls.len());
    for poll in polls {
        let options = Poll::options(&state.db, poll.poll_id).await?;
        let has_voted = Poll::has_voted(&state.db, poll.poll_id, auth.user_id).await?;
        views.push(PollView {
            poll,
            options,
            has_voted,
        });
    }

    Ok(Json(views))
}

/// Vote endpoint
///
/// One vote per user per poll. The vote row and the tally increment land
/// together or not at all.
///
/// # Errors
///
/// - `400 Bad Request`: Option belongs to another poll
/// - `404 Not Found`: No such poll
/// - `409 Conflict`: Poll closed, or caller already voted
pub async fn vote(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(poll_id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> ApiResult<Json<Vote>> {
    let vote = Poll::cast_vote(&state.db, poll_id, auth.user_id, req.option_id).await?;
    Ok(Json(vote))
}

/// Results endpoint
///
/// Options ranked by vote count with creation order as the tie-break; the
/// top three carry podium ranks.
///
/// # Errors
///
/// - `404 Not Found`: No such poll
pub async fn results(
    State(state): State<AppState>,
    Path(poll_id): Path<Uuid>,
) -> ApiResult<Json<PollResults>> {
    let results = Poll::results(&state.db, poll_id).await?;
    Ok(Json(results))
}

/// Close poll endpoint (admin)
///
/// One-way: a closed poll never reopens.
///
/// # Errors
///
/// - `404 Not Found`: No such poll
/// - `409 Conflict`: Poll already closed
pub async fn close_poll(
    State(state): State<AppState>,
    Path(poll_id): Path<Uuid>,
) -> ApiResult<Json<Poll>> {
    if let Some(closed) = Poll::close(&state.db, poll_id).await? {
        return Ok(Json(closed));
    }

    // Either missing or already closed; tell the caller which
    match Poll::find_by_id(&state.db, poll_id).await? {
        Some(_) => Err(ApiError::Conflict("Poll is already closed".to_string())),
        None => Err(ApiError::NotFound("Poll not found".to_string())),
    }
}
