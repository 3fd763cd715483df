//! Expense repository.
//!
//! Creation always lands in `approved` status; there is no draft state.
//! Updates branch on the caller's role: admins write directly, staff
//! updates become pending edit requests reviewed through the
//! `EditRequestRepository`. Deletion parks the expense at `rejected_edit`,
//! which doubles as the soft-delete marker.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use outlay_core::expense::{
    require_admin_access, require_expense_access, validation, Caller, ExpenseStatus,
    ProposedChanges, ReviewService, WorkflowError,
};
use outlay_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    expense_categories, expense_edit_requests, expenses,
    sea_orm_active_enums::{self, EditRequestStatus as DbEditRequestStatus},
    users,
};

use super::{db_err, expense_status_to_core, expense_status_to_db, is_unique_violation};

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Expense title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Optional receipt URL.
    pub receipt_url: Option<String>,
    /// Date the expense was incurred.
    pub expense_date: NaiveDate,
    /// Category the expense belongs to.
    pub category_id: Uuid,
}

/// Filters for listing expenses. All filters are optional and combined
/// with AND; the date range is inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Only expenses in this category.
    pub category_id: Option<Uuid>,
    /// Only expenses created by this user.
    pub created_by: Option<Uuid>,
    /// Only expenses with this status.
    pub status: Option<ExpenseStatus>,
    /// Only expenses on or after this date.
    pub date_from: Option<NaiveDate>,
    /// Only expenses on or before this date.
    pub date_to: Option<NaiveDate>,
}

/// Expense with its category and creator inlined.
#[derive(Debug, Clone)]
pub struct ExpenseRecord {
    /// Expense data.
    pub expense: expenses::Model,
    /// The expense's category.
    pub category: Option<expense_categories::Model>,
    /// The user who created the expense.
    pub created_by: Option<users::Model>,
}

/// Outcome of an expense update.
///
/// Admin updates apply immediately; staff updates open an edit request
/// that an admin resolves later.
#[derive(Debug, Clone)]
pub enum ExpenseUpdateOutcome {
    /// The changes were written directly to the expense.
    Applied(expenses::Model),
    /// The changes were parked as a pending edit request. Carries the
    /// expense in its `pending_edit` state alongside the request.
    EditRequested {
        /// The pending request awaiting review.
        request: expense_edit_requests::Model,
        /// The expense after moving to `pending_edit`.
        expense: expenses::Model,
    },
}

/// Repository for expenses.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an expense in `approved` status.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not staff or admin
    /// - The title or amount fails validation
    /// - The category does not exist
    /// - Database operation fails
    pub async fn create(
        &self,
        caller: Option<&Caller>,
        input: CreateExpenseInput,
    ) -> Result<expenses::Model, WorkflowError> {
        let caller = require_expense_access(caller)?;
        validation::validate_title(&input.title)?;
        validation::validate_amount(input.amount)?;

        expense_categories::Entity::find_by_id(input.category_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::CategoryNotFound(input.category_id))?;

        let now = Utc::now().into();
        let active = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            amount: Set(input.amount),
            receipt_url: Set(input.receipt_url),
            expense_date: Set(input.expense_date),
            status: Set(sea_orm_active_enums::ExpenseStatus::Approved),
            category_id: Set(input.category_id),
            created_by: Set(caller.user_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        active.insert(&self.db).await.map_err(db_err)
    }

    /// Updates an expense.
    ///
    /// Admin callers have their changes applied immediately. Staff callers
    /// get a pending edit request instead; the expense moves to
    /// `pending_edit` and blocks further staff edits until an admin
    /// resolves the request. The request insert and the status flip happen
    /// in one database transaction, with the partial unique index on
    /// pending requests deciding concurrent submissions.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not staff or admin
    /// - The payload is empty or fails field validation
    /// - The expense or a proposed category is not found
    /// - A pending edit request already exists for the expense
    /// - Database operation fails
    pub async fn update(
        &self,
        caller: Option<&Caller>,
        expense_id: Uuid,
        changes: ProposedChanges,
    ) -> Result<ExpenseUpdateOutcome, WorkflowError> {
        let caller = require_expense_access(caller)?;
        validation::validate_proposed_changes(&changes)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let expense = expenses::Entity::find_by_id(expense_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::ExpenseNotFound(expense_id))?;

        if let Some(category_id) = changes.category_id {
            expense_categories::Entity::find_by_id(category_id)
                .one(&txn)
                .await
                .map_err(db_err)?
                .ok_or(WorkflowError::CategoryNotFound(category_id))?;
        }

        let outcome = if caller.role.is_admin() {
            let mut active: expenses::ActiveModel = expense.into();
            apply_changes(&mut active, &changes);
            active.updated_at = Set(Utc::now().into());

            let updated = active.update(&txn).await.map_err(db_err)?;
            ExpenseUpdateOutcome::Applied(updated)
        } else {
            let current_status = expense_status_to_core(&expense.status);
            let next_status = ReviewService::request_edit(current_status)
                .map_err(|_| WorkflowError::DuplicatePendingEdit(expense_id))?;

            let now = Utc::now().into();
            let payload = serde_json::to_value(&changes)
                .map_err(|e| WorkflowError::Database(e.to_string()))?;

            let request = expense_edit_requests::ActiveModel {
                id: Set(Uuid::new_v4()),
                expense_id: Set(expense_id),
                requested_by: Set(caller.user_id),
                proposed_changes: Set(payload),
                status: Set(DbEditRequestStatus::Pending),
                reviewed_by: Set(None),
                reviewed_at: Set(None),
                rejection_reason: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };

            let inserted = request.insert(&txn).await.map_err(|e| {
                if is_unique_violation(&e) {
                    WorkflowError::DuplicatePendingEdit(expense_id)
                } else {
                    db_err(e)
                }
            })?;

            let mut active: expenses::ActiveModel = expense.into();
            active.status = Set(expense_status_to_db(next_status));
            active.updated_at = Set(now);
            let parked = active.update(&txn).await.map_err(db_err)?;

            ExpenseUpdateOutcome::EditRequested {
                request: inserted,
                expense: parked,
            }
        };

        txn.commit().await.map_err(db_err)?;

        Ok(outcome)
    }

    /// Soft-deletes an expense by parking it at `rejected_edit`.
    ///
    /// The row is kept for history; `rejected_edit` keeps it out of
    /// approved totals while staff can still see and re-edit it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not an admin
    /// - The expense is not found
    /// - Database operation fails
    pub async fn delete(
        &self,
        caller: Option<&Caller>,
        expense_id: Uuid,
    ) -> Result<expenses::Model, WorkflowError> {
        require_admin_access(caller)?;

        let expense = expenses::Entity::find_by_id(expense_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::ExpenseNotFound(expense_id))?;

        let mut active: expenses::ActiveModel = expense.into();
        active.status = Set(sea_orm_active_enums::ExpenseStatus::RejectedEdit);
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(db_err)
    }

    /// Gets a single expense with its category and creator.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not staff or admin
    /// - The expense is not found
    /// - Database operation fails
    pub async fn get(
        &self,
        caller: Option<&Caller>,
        expense_id: Uuid,
    ) -> Result<ExpenseRecord, WorkflowError> {
        require_expense_access(caller)?;

        let expense = expenses::Entity::find_by_id(expense_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::ExpenseNotFound(expense_id))?;

        let category = expense_categories::Entity::find_by_id(expense.category_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let created_by = users::Entity::find_by_id(expense.created_by)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(ExpenseRecord {
            expense,
            category,
            created_by,
        })
    }

    /// Lists expenses, filtered and paginated, newest expense date first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The caller is not staff or admin
    /// - Database operation fails
    pub async fn list(
        &self,
        caller: Option<&Caller>,
        filter: &ExpenseFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<ExpenseRecord>, WorkflowError> {
        require_expense_access(caller)?;

        let query = apply_filter(expenses::Entity::find(), filter);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let rows = query
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let records = self.attach_relations(rows).await?;

        Ok(PageResponse::new(records, page.page, page.per_page, total))
    }

    /// Inlines categories and creators for a page of expenses.
    async fn attach_relations(
        &self,
        rows: Vec<expenses::Model>,
    ) -> Result<Vec<ExpenseRecord>, WorkflowError> {
        let category_ids: Vec<Uuid> = rows.iter().map(|e| e.category_id).collect();
        let user_ids: Vec<Uuid> = rows.iter().map(|e| e.created_by).collect();

        let categories: HashMap<Uuid, expense_categories::Model> =
            expense_categories::Entity::find()
                .filter(expense_categories::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|c| (c.id, c))
                .collect();

        let creators: HashMap<Uuid, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(rows
            .into_iter()
            .map(|expense| {
                let category = categories.get(&expense.category_id).cloned();
                let created_by = creators.get(&expense.created_by).cloned();
                ExpenseRecord {
                    expense,
                    category,
                    created_by,
                }
            })
            .collect())
    }
}

/// Applies a partial-changes payload to an expense active model.
///
/// Shared with the edit-request approval path, which applies the same
/// payload shape after review.
pub(crate) fn apply_changes(active: &mut expenses::ActiveModel, changes: &ProposedChanges) {
    if let Some(title) = &changes.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = &changes.description {
        active.description = Set(Some(description.clone()));
    }
    if let Some(amount) = changes.amount {
        active.amount = Set(amount);
    }
    if let Some(receipt_url) = &changes.receipt_url {
        active.receipt_url = Set(Some(receipt_url.clone()));
    }
    if let Some(expense_date) = changes.expense_date {
        active.expense_date = Set(expense_date);
    }
    if let Some(category_id) = changes.category_id {
        active.category_id = Set(category_id);
    }
}

/// Applies list filters to an expense query.
fn apply_filter(mut query: Select<expenses::Entity>, filter: &ExpenseFilter) -> Select<expenses::Entity> {
    if let Some(category_id) = filter.category_id {
        query = query.filter(expenses::Column::CategoryId.eq(category_id));
    }
    if let Some(created_by) = filter.created_by {
        query = query.filter(expenses::Column::CreatedBy.eq(created_by));
    }
    if let Some(status) = filter.status {
        query = query.filter(expenses::Column::Status.eq(expense_status_to_db(status)));
    }
    if let Some(date_from) = filter.date_from {
        query = query.filter(expenses::Column::ExpenseDate.gte(date_from));
    }
    if let Some(date_to) = filter.date_to {
        query = query.filter(expenses::Column::ExpenseDate.lte(date_to));
    }
    query
}
