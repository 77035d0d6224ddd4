/// Billing endpoints
///
/// Bills are raised by the admin against a flat and settled by any resident
/// of that flat. Overdue detection is a lazy sweep run whenever a resident
/// views their bills, so a bill past its due date is overdue by the time
/// anyone looks at it.
///
/// # Endpoints
///
/// - `GET  /v1/bills` - Resident's own flat's bills (sweeps overdue first)
/// - `POST /v1/bills/:id/pay` - Pay an own-flat bill
/// - `POST /v1/admin/bills` - Raise a bill
/// - `GET  /v1/admin/bills` - List bills (optional `?status=` filter)
/// - `POST /v1/admin/bills/sweep-overdue` - Run the overdue sweep now
/// - `POST /v1/admin/bills/:id/mark-paid` - Settle on a resident's behalf
/// - `GET  /v1/admin/bills/stats` - Payment analytics

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use societysync_shared::{
    auth::middleware::AuthContext,
    models::{
        bill::{Bill, CreateBill, PaymentStats, PaymentStatus, ADMIN_OVERRIDE_METHOD},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create bill request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBillRequest {
    /// Flat the bill is addressed to
    #[validate(length(min = 1, max = 10, message = "Flat number must be 1-10 characters"))]
    pub flat_number: String,

    /// Bill category (e.g. "Maintenance", "Water")
    #[validate(length(min = 1, max = 50, message = "Bill type must be 1-50 characters"))]
    pub bill_type: String,

    /// Amount due, must be positive
    pub amount: Decimal,

    /// Date payment is due
    pub due_date: NaiveDate,
}

/// Pay bill request
#[derive(Debug, Deserialize, Validate)]
pub struct PayBillRequest {
    /// How the bill is being settled (e.g. "Cash", "UPI", "Bank Transfer")
    #[validate(length(min = 1, max = 50, message = "Payment method must be 1-50 characters"))]
    pub payment_method: String,
}

/// List bills query parameters
#[derive(Debug, Deserialize)]
pub struct ListBillsQuery {
    /// Filter to one status
    pub status: Option<PaymentStatus>,
}

/// Resident's bill overview
#[derive(Debug, Serialize)]
pub struct MyBillsResponse {
    /// All bills for the resident's flat, newest first
    pub bills: Vec<Bill>,

    /// Sum of pending and overdue amounts
    pub outstanding: Decimal,
}

/// Result of an overdue sweep
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    /// Number of bills transitioned to overdue
    pub swept: u64,
}

/// Payment analytics response
#[derive(Debug, Serialize)]
pub struct PaymentStatsResponse {
    /// Raw counts and sums
    #[serde(flatten)]
    pub stats: PaymentStats,

    /// Collected amount as a percentage of billed amount
    pub collection_rate: f64,
}

/// Resolves the caller's flat number, admins have none
async fn caller_flat(state: &AppState, auth: &AuthContext) -> ApiResult<String> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    user.flat_number
        .filter(|f| !f.is_empty() && f.as_str() != "ADMIN")
        .ok_or_else(|| ApiError::Forbidden("Account has no flat assigned".to_string()))
}

/// Resident bill listing
///
/// Runs the overdue sweep first so the listing never shows a stale pending
/// bill past its due date, then returns the flat's bills together with the
/// outstanding total.
pub async fn list_my_bills(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MyBillsResponse>> {
    let flat_number = caller_flat(&state, &auth).await?;

    Bill::sweep_overdue(&state.db).await?;

    let bills = Bill::list_for_flat(&state.db, &flat_number).await?;
    let outstanding = Bill::outstanding_for_flat(&state.db, &flat_number).await?;

    Ok(Json(MyBillsResponse { bills, outstanding }))
}

/// Pay bill endpoint
///
/// A resident settles a bill addressed to their own flat. The recorded
/// method is whatever the resident chose; "Admin Override" is reserved for
/// the admin's mark-paid endpoint.
///
/// # Errors
///
/// - `403 Forbidden`: Bill belongs to another flat
/// - `404 Not Found`: No such bill
/// - `409 Conflict`: Bill is already paid
pub async fn pay_bill(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(bill_id): Path<Uuid>,
    Json(req): Json<PayBillRequest>,
) -> ApiResult<Json<Bill>> {
    req.validate().map_err(ApiError::from_validation)?;

    if req.payment_method == ADMIN_OVERRIDE_METHOD && !auth.is_admin() {
        return Err(ApiError::BadRequest(
            "Reserved payment method".to_string(),
        ));
    }

    let bill = Bill::find_by_id(&state.db, bill_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bill not found".to_string()))?;

    if !auth.is_admin() {
        let flat_number = caller_flat(&state, &auth).await?;
        if bill.flat_number != flat_number {
            return Err(ApiError::Forbidden(
                "Bill belongs to another flat".to_string(),
            ));
        }
    }

    if !bill.payment_status.can_transition_to(PaymentStatus::Paid) {
        return Err(ApiError::Conflict("Bill is already paid".to_string()));
    }

    let paid = Bill::pay(&state.db, bill_id, &req.payment_method)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bill not found".to_string()))?;

    Ok(Json(paid))
}

/// Create bill endpoint (admin)
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Non-positive amount or invalid fields
pub async fn create_bill(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBillRequest>,
) -> ApiResult<Json<Bill>> {
    req.validate().map_err(ApiError::from_validation)?;

    if req.amount <= Decimal::ZERO {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "amount".to_string(),
            message: "Amount must be positive".to_string(),
        }]));
    }

    let bill = Bill::create(
        &state.db,
        CreateBill {
            flat_number: req.flat_number,
            bill_type: req.bill_type,
            amount: req.amount,
            due_date: req.due_date,
            created_by: Some(auth.user_id),
        },
    )
    .await?;

    Ok(Json(bill))
}

/// List bills endpoint (admin)
pub async fn list_bills(
    State(state): State<AppState>,
    Query(query): Query<ListBillsQuery>,
) -> ApiResult<Json<Vec<Bill>>> {
    let bills = Bill::list(&state.db, query.status).await?;
    Ok(Json(bills))
}

/// Manual overdue sweep endpoint (admin)
pub async fn sweep_overdue(State(state): State<AppState>) -> ApiResult<Json<SweepResponse>> {
    let swept = Bill::sweep_overdue(&state.db).await?;
    Ok(Json(SweepResponse { swept }))
}

/// Mark-paid endpoint (admin)
///
/// Settles a bill on a resident's behalf with the "Admin Override" method,
/// used for cash handed over in person.
///
/// # Errors
///
/// - `404 Not Found`: No such bill
/// - `409 Conflict`: Bill is already paid
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(bill_id): Path<Uuid>,
) -> ApiResult<Json<Bill>> {
    let bill = Bill::find_by_id(&state.db, bill_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bill not found".to_string()))?;

    if !bill.payment_status.can_transition_to(PaymentStatus::Paid) {
        return Err(ApiError::Conflict("Bill is already paid".to_string()));
    }

    let paid = Bill::pay(&state.db, bill_id, ADMIN_OVERRIDE_METHOD)
        .await?
        .ok_or_else(|| ApiError::NotFound("Bill not found".to_string()))?;

    Ok(Json(paid))
}

/// Payment analytics endpoint (admin)
pub async fn payment_stats(State(state): State<AppState>) -> ApiResult<Json<PaymentStatsResponse>> {
    let stats = Bill::payment_stats(&state.db).await?;
    let collection_rate = stats.collection_rate();

    Ok(Json(PaymentStatsResponse {
        stats,
        collection_rate,
    }))
}
