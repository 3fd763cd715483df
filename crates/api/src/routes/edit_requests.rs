//! Edit request review routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::workflow_error_response};
use outlay_core::expense::EditRequestStatus;
use outlay_db::entities::expense_edit_requests;
use outlay_db::repositories::edit_request::{
    EditRequestFilter, EditRequestRepository, PendingEditRequest, ReviewOutcome,
};
use outlay_shared::types::PageRequest;

use super::expenses::{ExpenseResponse, UserSummary, expense_to_response};

/// Creates the edit request routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/edit-requests", get(list_edit_requests))
        .route("/edit-requests/pending", get(list_pending_edit_requests))
        .route("/edit-requests/{request_id}", get(get_edit_request))
        .route(
            "/edit-requests/{request_id}/approve",
            post(approve_edit_request),
        )
        .route(
            "/edit-requests/{request_id}/reject",
            post(reject_edit_request),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for rejecting an edit request.
#[derive(Debug, Deserialize)]
pub struct RejectEditRequestBody {
    /// Optional reason shown to the requester.
    pub rejection_reason: Option<String>,
}

/// Query parameters for listing edit requests.
#[derive(Debug, Deserialize)]
pub struct ListEditRequestsQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
    /// Only requests for this expense.
    pub expense_id: Option<Uuid>,
    /// Only requests submitted by this user.
    pub requested_by: Option<Uuid>,
    /// Only requests with this status.
    pub status: Option<String>,
}

/// Response for an edit request.
#[derive(Debug, Serialize)]
pub struct EditRequestResponse {
    /// Request ID.
    pub id: Uuid,
    /// Target expense ID.
    pub expense_id: Uuid,
    /// User who submitted the request.
    pub requested_by: Uuid,
    /// Field-level diff awaiting review.
    pub proposed_changes: serde_json::Value,
    /// Status.
    pub status: &'static str,
    /// Admin who reviewed the request, once resolved.
    pub reviewed_by: Option<Uuid>,
    /// When the request was reviewed.
    pub reviewed_at: Option<String>,
    /// Reason given on rejection.
    pub rejection_reason: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

/// Response entry for the pending review queue.
#[derive(Debug, Serialize)]
pub struct PendingEditRequestResponse {
    /// The pending request.
    pub request: EditRequestResponse,
    /// The expense the request targets, with its category inlined.
    pub expense: Option<ExpenseResponse>,
    /// The staff member who submitted the request.
    pub requested_by: Option<UserSummary>,
}

pub(crate) fn request_to_response(
    request: expense_edit_requests::Model,
) -> EditRequestResponse {
    use outlay_db::entities::sea_orm_active_enums::EditRequestStatus as DbStatus;

    let status = match request.status {
        DbStatus::Pending => "pending",
        DbStatus::Approved => "approved",
        DbStatus::Rejected => "rejected",
    };

    EditRequestResponse {
        id: request.id,
        expense_id: request.expense_id,
        requested_by: request.requested_by,
        proposed_changes: request.proposed_changes,
        status,
        reviewed_by: request.reviewed_by,
        reviewed_at: request.reviewed_at.map(|t| t.to_rfc3339()),
        rejection_reason: request.rejection_reason,
        created_at: request.created_at.to_rfc3339(),
        updated_at: request.updated_at.to_rfc3339(),
    }
}

fn pending_to_response(pending: PendingEditRequest) -> PendingEditRequestResponse {
    let expense = pending
        .expense
        .map(|e| expense_to_response(e, pending.category, None));

    PendingEditRequestResponse {
        request: request_to_response(pending.request),
        expense,
        requested_by: pending.requested_by.map(|u| UserSummary {
            id: u.id,
            name: u.name,
        }),
    }
}

fn outcome_to_response(outcome: ReviewOutcome) -> serde_json::Value {
    json!({
        "edit_request": request_to_response(outcome.request),
        "expense": expense_to_response(outcome.expense, None, None),
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/edit-requests` - List edit requests, newest first.
async fn list_edit_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListEditRequestsQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(s) => match EditRequestStatus::parse(s) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": format!("Unknown edit request status: {s}")
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let filter = EditRequestFilter {
        expense_id: query.expense_id,
        requested_by: query.requested_by,
        status,
    };

    let mut page = PageRequest::default();
    if let Some(p) = query.page {
        page.page = p;
    }
    if let Some(pp) = query.per_page {
        page.per_page = pp;
    }

    let repo = EditRequestRepository::new((*state.db).clone());

    match repo.list(auth.caller().as_ref(), &filter, &page).await {
        Ok(result) => {
            let items: Vec<EditRequestResponse> =
                result.data.into_iter().map(request_to_response).collect();

            (
                StatusCode::OK,
                Json(json!({ "data": items, "meta": result.meta })),
            )
                .into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/edit-requests/pending` - Admin review queue, oldest first.
async fn list_pending_edit_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> impl IntoResponse {
    let repo = EditRequestRepository::new((*state.db).clone());

    match repo.list_pending(auth.caller().as_ref()).await {
        Ok(pending) => {
            let items: Vec<PendingEditRequestResponse> =
                pending.into_iter().map(pending_to_response).collect();

            (StatusCode::OK, Json(json!({ "data": items }))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/edit-requests/{request_id}` - Get an edit request.
async fn get_edit_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = EditRequestRepository::new((*state.db).clone());

    match repo.get(auth.caller().as_ref(), request_id).await {
        Ok(request) => (StatusCode::OK, Json(request_to_response(request))).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// POST `/edit-requests/{request_id}/approve` - Approve a pending request.
async fn approve_edit_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = EditRequestRepository::new((*state.db).clone());

    match repo.approve(auth.caller().as_ref(), request_id).await {
        Ok(outcome) => {
            info!(request_id = %request_id, "Edit request approved");
            (StatusCode::OK, Json(outcome_to_response(outcome))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// POST `/edit-requests/{request_id}/reject` - Reject a pending request.
async fn reject_edit_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<RejectEditRequestBody>,
) -> impl IntoResponse {
    let repo = EditRequestRepository::new((*state.db).clone());

    match repo
        .reject(auth.caller().as_ref(), request_id, payload.rejection_reason)
        .await
    {
        Ok(outcome) => {
            info!(request_id = %request_id, "Edit request rejected");
            (StatusCode::OK, Json(outcome_to_response(outcome))).into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}
