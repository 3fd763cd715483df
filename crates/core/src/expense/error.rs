//! Expense workflow error types.
//!
//! One error enum covers the whole domain: access gates, CRUD operations,
//! and the edit-request state machine all raise `WorkflowError`, which the
//! API layer maps to a stable kind tag and HTTP status.

use thiserror::Error;
use uuid::Uuid;

use crate::expense::access::Role;
use crate::expense::types::EditRequestStatus;

/// Errors that can occur during expense workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No authenticated caller.
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated but insufficient role.
    #[error("Role {role} may not perform this operation ({required} required)")]
    Forbidden {
        /// The caller's role.
        role: Role,
        /// The role the operation requires.
        required: String,
    },

    /// Attempted to resolve an edit request that is not pending.
    #[error("Edit request is {from}, expected pending")]
    InvalidState {
        /// The request's current status.
        from: EditRequestStatus,
        /// The status the operation attempted to set.
        attempted: EditRequestStatus,
    },

    /// Expense not found.
    #[error("Expense {0} not found")]
    ExpenseNotFound(Uuid),

    /// Edit request not found.
    #[error("Edit request {0} not found")]
    EditRequestNotFound(Uuid),

    /// Category not found.
    #[error("Expense category {0} not found")]
    CategoryNotFound(Uuid),

    /// A pending edit request already exists for the expense.
    #[error("Expense {0} already has a pending edit request")]
    DuplicatePendingEdit(Uuid),

    /// Another category already uses this name.
    #[error("Expense category named {0:?} already exists")]
    DuplicateCategoryName(String),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden { .. } => 403,
            Self::InvalidState { .. } | Self::Validation(_) => 400,
            Self::ExpenseNotFound(_) | Self::EditRequestNotFound(_) | Self::CategoryNotFound(_) => {
                404
            }
            Self::DuplicatePendingEdit(_) | Self::DuplicateCategoryName(_) => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::EditRequestNotFound(_) => "EDIT_REQUEST_NOT_FOUND",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::DuplicatePendingEdit(_) => "DUPLICATE_PENDING_EDIT",
            Self::DuplicateCategoryName(_) => "DUPLICATE_CATEGORY_NAME",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_error() {
        let err = WorkflowError::Unauthorized;
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_forbidden_error() {
        let err = WorkflowError::Forbidden {
            role: Role::Customer,
            required: "staff or admin".to_string(),
        };
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert!(err.to_string().contains("customer"));
    }

    #[test]
    fn test_invalid_state_error() {
        let err = WorkflowError::InvalidState {
            from: EditRequestStatus::Approved,
            attempted: EditRequestStatus::Rejected,
        };
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_STATE");
        assert!(err.to_string().contains("approved"));
    }

    #[test]
    fn test_not_found_errors() {
        assert_eq!(WorkflowError::ExpenseNotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(
            WorkflowError::EditRequestNotFound(Uuid::nil()).status_code(),
            404
        );
        assert_eq!(
            WorkflowError::CategoryNotFound(Uuid::nil()).status_code(),
            404
        );
    }

    #[test]
    fn test_conflict_errors() {
        let err = WorkflowError::DuplicatePendingEdit(Uuid::nil());
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "DUPLICATE_PENDING_EDIT");

        let err = WorkflowError::DuplicateCategoryName("Travel".to_string());
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "DUPLICATE_CATEGORY_NAME");
        assert!(err.to_string().contains("Travel"));
    }

    #[test]
    fn test_validation_and_database_errors() {
        assert_eq!(
            WorkflowError::Validation("bad".to_string()).status_code(),
            400
        );
        assert_eq!(WorkflowError::Database("down".to_string()).status_code(), 500);
    }
}
