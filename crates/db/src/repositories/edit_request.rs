//! Edit request repository.
//!
//! Admins resolve pending staff edit requests here. A resolution writes
//! the request's terminal status and the expense's mirrored status in one
//! database transaction, so the pair can never drift apart. Approval also
//! applies the proposed changes; rejection discards them and parks the
//! expense at `rejected_edit`.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use outlay_core::expense::{
    require_admin_access, require_expense_access, Caller, EditRequestStatus, ProposedChanges,
    ReviewAction, ReviewService, WorkflowError,
};
use outlay_shared::types::{PageRequest, PageResponse};

use crate::entities::{expense_categories, expense_edit_requests, expenses, users};

use super::{db_err, expense_status_to_db, request_status_to_core, request_status_to_db};

use super::expense::apply_changes;

/// Filters for listing edit requests.
#[derive(Debug, Clone, Default)]
pub struct EditRequestFilter {
    /// Only requests for this expense.
    pub expense_id: Option<Uuid>,
    /// Only requests submitted by this user.
    pub requested_by: Option<Uuid>,
    /// Only requests with this status.
    pub status: Option<EditRequestStatus>,
}

/// Outcome of resolving an edit request.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    /// The resolved request.
    pub request: expense_edit_requests::Model,
    /// The expense after the resolution was applied.
    pub expense: expenses::Model,
}

/// Pending edit request with its expense, category, and requester inlined
/// for the review queue.
#[derive(Debug, Clone)]
pub struct PendingEditRequest {
    /// Request data.
    pub request: expense_edit_requests::Model,
    /// The expense the request targets.
    pub expense: Option<expenses::Model>,
    /// The expense's category.
    pub category: Option<expense_categories::Model>,
    /// The staff member who submitted the request.
    pub requested_by: Option<users::Model>,
}

/// Repository for expense edit requests.
#[derive(Debug, Clone)]
pub struct EditRequestRepository {
    db: DatabaseConnection,
}

impl EditRequestRepository {
    /// Creates a new edit request repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Approves a pending edit request and applies its proposed changes.
    ///
    /// The request flips to `approved`, the proposed changes are written to
    /// the expense, and the expense is restored to `approved`, all in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not an admin
    /// - The request is not found or not pending
    /// - A proposed category no longer exists
    /// - Database operation fails
    pub async fn approve(
        &self,
        caller: Option<&Caller>,
        request_id: Uuid,
    ) -> Result<ReviewOutcome, WorkflowError> {
        let caller = require_admin_access(caller)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        // Row lock so a concurrent review re-reads the committed terminal
        // status instead of overwriting it.
        let request = expense_edit_requests::Entity::find_by_id(request_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::EditRequestNotFound(request_id))?;

        let current = request_status_to_core(&request.status);
        let action = ReviewService::approve(current, caller.user_id)?;

        let expense = expenses::Entity::find_by_id(request.expense_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::ExpenseNotFound(request.expense_id))?;

        let changes: ProposedChanges = serde_json::from_value(request.proposed_changes.clone())
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        if let Some(category_id) = changes.category_id {
            expense_categories::Entity::find_by_id(category_id)
                .one(&txn)
                .await
                .map_err(db_err)?
                .ok_or(WorkflowError::CategoryNotFound(category_id))?;
        }

        let now = match &action {
            ReviewAction::Approve { reviewed_at, .. }
            | ReviewAction::Reject { reviewed_at, .. } => (*reviewed_at).into(),
        };

        let mut expense_active: expenses::ActiveModel = expense.into();
        apply_changes(&mut expense_active, &changes);
        expense_active.status = Set(expense_status_to_db(action.expense_status()));
        expense_active.updated_at = Set(now);
        let updated_expense = expense_active.update(&txn).await.map_err(db_err)?;

        let mut request_active: expense_edit_requests::ActiveModel = request.into();
        request_active.status = Set(request_status_to_db(action.request_status()));
        request_active.reviewed_by = Set(Some(caller.user_id));
        request_active.reviewed_at = Set(Some(now));
        request_active.updated_at = Set(now);
        let updated_request = request_active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(ReviewOutcome {
            request: updated_request,
            expense: updated_expense,
        })
    }

    /// Rejects a pending edit request without applying its changes.
    ///
    /// The request flips to `rejected` and the expense is parked at
    /// `rejected_edit` in the same transaction. The prior expense state is
    /// deliberately not restored; staff may submit a fresh edit request
    /// from `rejected_edit`. A blank rejection reason is stored as none.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not an admin
    /// - The request is not found or not pending
    /// - Database operation fails
    pub async fn reject(
        &self,
        caller: Option<&Caller>,
        request_id: Uuid,
        rejection_reason: Option<String>,
    ) -> Result<ReviewOutcome, WorkflowError> {
        let caller = require_admin_access(caller)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let request = expense_edit_requests::Entity::find_by_id(request_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::EditRequestNotFound(request_id))?;

        let current = request_status_to_core(&request.status);
        let action = ReviewService::reject(current, caller.user_id, rejection_reason)?;

        let expense = expenses::Entity::find_by_id(request.expense_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::ExpenseNotFound(request.expense_id))?;

        let (now, reason) = match &action {
            ReviewAction::Reject {
                reviewed_at,
                rejection_reason,
                ..
            } => ((*reviewed_at).into(), rejection_reason.clone()),
            ReviewAction::Approve { reviewed_at, .. } => ((*reviewed_at).into(), None),
        };

        let mut expense_active: expenses::ActiveModel = expense.into();
        expense_active.status = Set(expense_status_to_db(action.expense_status()));
        expense_active.updated_at = Set(now);
        let updated_expense = expense_active.update(&txn).await.map_err(db_err)?;

        let mut request_active: expense_edit_requests::ActiveModel = request.into();
        request_active.status = Set(request_status_to_db(action.request_status()));
        request_active.reviewed_by = Set(Some(caller.user_id));
        request_active.reviewed_at = Set(Some(now));
        request_active.rejection_reason = Set(reason);
        request_active.updated_at = Set(now);
        let updated_request = request_active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(ReviewOutcome {
            request: updated_request,
            expense: updated_expense,
        })
    }

    /// Gets a single edit request by id.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not staff or admin
    /// - The request is not found
    /// - Database operation fails
    pub async fn get(
        &self,
        caller: Option<&Caller>,
        request_id: Uuid,
    ) -> Result<expense_edit_requests::Model, WorkflowError> {
        require_expense_access(caller)?;

        expense_edit_requests::Entity::find_by_id(request_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::EditRequestNotFound(request_id))
    }

    /// Lists edit requests, filtered and paginated, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not staff or admin
    /// - Database operation fails
    pub async fn list(
        &self,
        caller: Option<&Caller>,
        filter: &EditRequestFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<expense_edit_requests::Model>, WorkflowError> {
        require_expense_access(caller)?;

        let query = apply_filter(expense_edit_requests::Entity::find(), filter);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let data = query
            .order_by_desc(expense_edit_requests::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Lists all pending edit requests for the admin review queue,
    /// oldest first, with expense, category, and requester inlined.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not an admin
    /// - Database operation fails
    pub async fn list_pending(
        &self,
        caller: Option<&Caller>,
    ) -> Result<Vec<PendingEditRequest>, WorkflowError> {
        require_admin_access(caller)?;

        let requests = expense_edit_requests::Entity::find()
            .filter(
                expense_edit_requests::Column::Status
                    .eq(crate::entities::sea_orm_active_enums::EditRequestStatus::Pending),
            )
            .order_by_asc(expense_edit_requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let expense_ids: Vec<Uuid> = requests.iter().map(|r| r.expense_id).collect();
        let requester_ids: Vec<Uuid> = requests.iter().map(|r| r.requested_by).collect();

        let expense_map: HashMap<Uuid, expenses::Model> = expenses::Entity::find()
            .filter(expenses::Column::Id.is_in(expense_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        let category_ids: Vec<Uuid> = expense_map.values().map(|e| e.category_id).collect();
        let category_map: HashMap<Uuid, expense_categories::Model> =
            expense_categories::Entity::find()
                .filter(expense_categories::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|c| (c.id, c))
                .collect();

        let requester_map: HashMap<Uuid, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(requester_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(requests
            .into_iter()
            .map(|request| {
                let expense = expense_map.get(&request.expense_id).cloned();
                let category = expense
                    .as_ref()
                    .and_then(|e| category_map.get(&e.category_id).cloned());
                let requested_by = requester_map.get(&request.requested_by).cloned();
                PendingEditRequest {
                    request,
                    expense,
                    category,
                    requested_by,
                }
            })
            .collect())
    }
}

/// Applies list filters to an edit request query.
fn apply_filter(
    mut query: Select<expense_edit_requests::Entity>,
    filter: &EditRequestFilter,
) -> Select<expense_edit_requests::Entity> {
    if let Some(expense_id) = filter.expense_id {
        query = query.filter(expense_edit_requests::Column::ExpenseId.eq(expense_id));
    }
    if let Some(requested_by) = filter.requested_by {
        query = query.filter(expense_edit_requests::Column::RequestedBy.eq(requested_by));
    }
    if let Some(status) = filter.status {
        query = query.filter(expense_edit_requests::Column::Status.eq(request_status_to_db(status)));
    }
    query
}
