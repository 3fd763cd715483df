//! Repository layer for data access.
//!
//! Each repository owns a `DatabaseConnection` and gates every operation
//! through the core access checks before touching any data.

pub mod category;
pub mod edit_request;
pub mod expense;

pub use category::CategoryRepository;
pub use edit_request::EditRequestRepository;
pub use expense::ExpenseRepository;

use sea_orm::error::SqlErr;
use sea_orm::DbErr;

use outlay_core::expense::{EditRequestStatus, ExpenseStatus, WorkflowError};

use crate::entities::sea_orm_active_enums;

// ============================================================================
// Conversion helpers
// ============================================================================

/// Converts database ExpenseStatus to core ExpenseStatus.
pub(crate) fn expense_status_to_core(status: &sea_orm_active_enums::ExpenseStatus) -> ExpenseStatus {
    match status {
        sea_orm_active_enums::ExpenseStatus::Approved => ExpenseStatus::Approved,
        sea_orm_active_enums::ExpenseStatus::PendingEdit => ExpenseStatus::PendingEdit,
        sea_orm_active_enums::ExpenseStatus::RejectedEdit => ExpenseStatus::RejectedEdit,
    }
}

/// Converts core ExpenseStatus to database ExpenseStatus.
pub(crate) fn expense_status_to_db(status: ExpenseStatus) -> sea_orm_active_enums::ExpenseStatus {
    match status {
        ExpenseStatus::Approved => sea_orm_active_enums::ExpenseStatus::Approved,
        ExpenseStatus::PendingEdit => sea_orm_active_enums::ExpenseStatus::PendingEdit,
        ExpenseStatus::RejectedEdit => sea_orm_active_enums::ExpenseStatus::RejectedEdit,
    }
}

/// Converts database EditRequestStatus to core EditRequestStatus.
pub(crate) fn request_status_to_core(
    status: &sea_orm_active_enums::EditRequestStatus,
) -> EditRequestStatus {
    match status {
        sea_orm_active_enums::EditRequestStatus::Pending => EditRequestStatus::Pending,
        sea_orm_active_enums::EditRequestStatus::Approved => EditRequestStatus::Approved,
        sea_orm_active_enums::EditRequestStatus::Rejected => EditRequestStatus::Rejected,
    }
}

/// Converts core EditRequestStatus to database EditRequestStatus.
pub(crate) fn request_status_to_db(
    status: EditRequestStatus,
) -> sea_orm_active_enums::EditRequestStatus {
    match status {
        EditRequestStatus::Pending => sea_orm_active_enums::EditRequestStatus::Pending,
        EditRequestStatus::Approved => sea_orm_active_enums::EditRequestStatus::Approved,
        EditRequestStatus::Rejected => sea_orm_active_enums::EditRequestStatus::Rejected,
    }
}

/// Maps a database error to a workflow error.
pub(crate) fn db_err(err: DbErr) -> WorkflowError {
    WorkflowError::Database(err.to_string())
}

/// True when the error is a unique constraint violation.
///
/// Used to translate races on unique indexes (category names, the
/// one-pending-edit-per-expense index) into domain conflicts.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
