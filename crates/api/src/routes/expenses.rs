//! Expense management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::workflow_error_response};
use outlay_core::expense::{ExpenseStatus, ProposedChanges};
use outlay_db::entities::{expense_categories, expenses, users};
use outlay_db::repositories::expense::{
    CreateExpenseInput, ExpenseFilter, ExpenseRecord, ExpenseRepository, ExpenseUpdateOutcome,
};
use outlay_shared::types::PageRequest;

use super::edit_requests::request_to_response;

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses))
        .route("/expenses", post(create_expense))
        .route("/expenses/{expense_id}", get(get_expense))
        .route("/expenses/{expense_id}", patch(update_expense))
        .route("/expenses/{expense_id}", delete(delete_expense))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// Expense title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Amount as a decimal string.
    pub amount: String,
    /// Optional receipt URL.
    pub receipt_url: Option<String>,
    /// Date the expense was incurred.
    pub expense_date: NaiveDate,
    /// Category the expense belongs to.
    pub category_id: Uuid,
}

/// Request body for updating an expense. Every field is optional.
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New amount as a decimal string.
    pub amount: Option<String>,
    /// New receipt URL.
    pub receipt_url: Option<String>,
    /// New expense date.
    pub expense_date: Option<NaiveDate>,
    /// New category.
    pub category_id: Option<Uuid>,
}

/// Query parameters for listing expenses.
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
    /// Only expenses in this category.
    pub category_id: Option<Uuid>,
    /// Only expenses created by this user.
    pub created_by: Option<Uuid>,
    /// Only expenses with this status.
    pub status: Option<String>,
    /// Only expenses on or after this date.
    pub date_from: Option<NaiveDate>,
    /// Only expenses on or before this date.
    pub date_to: Option<NaiveDate>,
}

/// Category summary inlined into expense responses.
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    /// Category ID.
    pub id: Uuid,
    /// Name.
    pub name: String,
}

/// User summary inlined into expense responses.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

/// Response for an expense.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Amount as a decimal string.
    pub amount: String,
    /// Receipt URL.
    pub receipt_url: Option<String>,
    /// Expense date.
    pub expense_date: NaiveDate,
    /// Status.
    pub status: &'static str,
    /// Category, when inlined.
    pub category: Option<CategorySummary>,
    /// Creator, when inlined.
    pub created_by: Option<UserSummary>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

pub(crate) fn expense_to_response(
    expense: expenses::Model,
    category: Option<expense_categories::Model>,
    created_by: Option<users::Model>,
) -> ExpenseResponse {
    use outlay_db::entities::sea_orm_active_enums::ExpenseStatus as DbStatus;

    let status = match expense.status {
        DbStatus::Approved => "approved",
        DbStatus::PendingEdit => "pending_edit",
        DbStatus::RejectedEdit => "rejected_edit",
    };

    ExpenseResponse {
        id: expense.id,
        title: expense.title,
        description: expense.description,
        amount: expense.amount.to_string(),
        receipt_url: expense.receipt_url,
        expense_date: expense.expense_date,
        status,
        category: category.map(|c| CategorySummary {
            id: c.id,
            name: c.name,
        }),
        created_by: created_by.map(|u| UserSummary {
            id: u.id,
            name: u.name,
        }),
        created_at: expense.created_at.to_rfc3339(),
        updated_at: expense.updated_at.to_rfc3339(),
    }
}

fn record_to_response(record: ExpenseRecord) -> ExpenseResponse {
    expense_to_response(record.expense, record.category, record.created_by)
}

#[allow(clippy::result_large_err)]
fn parse_amount(s: &str) -> Result<Decimal, axum::response::Response> {
    Decimal::from_str(s).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Invalid amount format"
            })),
        )
            .into_response()
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/expenses` - List expenses with filters, newest expense date first.
async fn list_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListExpensesQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(s) => match ExpenseStatus::parse(s) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": format!("Unknown expense status: {s}")
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let filter = ExpenseFilter {
        category_id: query.category_id,
        created_by: query.created_by,
        status,
        date_from: query.date_from,
        date_to: query.date_to,
    };

    let mut page = PageRequest::default();
    if let Some(p) = query.page {
        page.page = p;
    }
    if let Some(pp) = query.per_page {
        page.per_page = pp;
    }

    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.list(auth.caller().as_ref(), &filter, &page).await {
        Ok(result) => {
            let items: Vec<ExpenseResponse> =
                result.data.into_iter().map(record_to_response).collect();

            (
                StatusCode::OK,
                Json(json!({ "data": items, "meta": result.meta })),
            )
                .into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// POST `/expenses` - Create an expense, approved immediately.
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    let amount = match parse_amount(&payload.amount) {
        Ok(a) => a,
        Err(e) => return e,
    };

    let repo = ExpenseRepository::new((*state.db).clone());

    let input = CreateExpenseInput {
        title: payload.title,
        description: payload.description,
        amount,
        receipt_url: payload.receipt_url,
        expense_date: payload.expense_date,
        category_id: payload.category_id,
    };

    match repo.create(auth.caller().as_ref(), input).await {
        Ok(expense) => {
            info!(expense_id = %expense.id, "Expense created");
            (
                StatusCode::CREATED,
                Json(expense_to_response(expense, None, None)),
            )
                .into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// GET `/expenses/{expense_id}` - Get an expense with relations inlined.
async fn get_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.get(auth.caller().as_ref(), expense_id).await {
        Ok(record) => (StatusCode::OK, Json(record_to_response(record))).into_response(),
        Err(e) => workflow_error_response(&e),
    }
}

/// PATCH `/expenses/{expense_id}` - Update an expense.
///
/// Admin changes apply immediately (200 with the expense); staff changes
/// open a pending edit request instead (202 with the request and the
/// expense in its `pending_edit` state).
async fn update_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> impl IntoResponse {
    let amount = match payload.amount.as_deref() {
        Some(s) => match parse_amount(s) {
            Ok(a) => Some(a),
            Err(e) => return e,
        },
        None => None,
    };

    let changes = ProposedChanges {
        title: payload.title,
        description: payload.description,
        amount,
        receipt_url: payload.receipt_url,
        expense_date: payload.expense_date,
        category_id: payload.category_id,
    };

    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.update(auth.caller().as_ref(), expense_id, changes).await {
        Ok(ExpenseUpdateOutcome::Applied(expense)) => {
            info!(expense_id = %expense_id, "Expense updated");
            (
                StatusCode::OK,
                Json(json!({ "applied": true, "expense": expense_to_response(expense, None, None) })),
            )
                .into_response()
        }
        Ok(ExpenseUpdateOutcome::EditRequested { request, expense }) => {
            info!(
                expense_id = %expense_id,
                request_id = %request.id,
                "Edit request opened"
            );
            (
                StatusCode::ACCEPTED,
                Json(json!({
                    "applied": false,
                    "edit_request": request_to_response(request),
                    "expense": expense_to_response(expense, None, None),
                })),
            )
                .into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}

/// DELETE `/expenses/{expense_id}` - Soft-delete an expense.
///
/// The expense is parked at `rejected_edit` and kept as history.
async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.delete(auth.caller().as_ref(), expense_id).await {
        Ok(expense) => {
            info!(expense_id = %expense_id, "Expense soft-deleted");
            (
                StatusCode::OK,
                Json(expense_to_response(expense, None, None)),
            )
                .into_response()
        }
        Err(e) => workflow_error_response(&e),
    }
}
