//! Edit-request review state machine.
//!
//! This module implements the core state machine for resolving staff edit
//! requests. An expense's visible status mirrors its request's status:
//!
//! ```text
//! request:  Pending ──approve──▶ Approved        (terminal)
//!                   └──reject───▶ Rejected        (terminal)
//! expense:  Approved ⇄ PendingEdit ──▶ Approved | RejectedEdit
//! ```
//!
//! Approve restores the expense to `Approved`; reject deliberately does
//! NOT restore the prior state and parks the expense at `RejectedEdit`.

use chrono::Utc;
use uuid::Uuid;

use crate::expense::error::WorkflowError;
use crate::expense::types::{EditRequestStatus, ExpenseStatus, ReviewAction};

/// Stateless service for edit-request state transitions.
///
/// All methods are associated functions that validate and execute state
/// transitions, returning the appropriate `ReviewAction` with audit trail
/// information. The persistence layer is responsible for applying both
/// status writes atomically.
pub struct ReviewService;

impl ReviewService {
    /// Approves a pending edit request.
    ///
    /// # Arguments
    /// * `current` - The request's current status
    /// * `reviewed_by` - The admin approving the request
    ///
    /// # Returns
    /// * `Ok(ReviewAction::Approve)` if the request is pending
    /// * `Err(WorkflowError::InvalidState)` otherwise
    pub fn approve(
        current: EditRequestStatus,
        reviewed_by: Uuid,
    ) -> Result<ReviewAction, WorkflowError> {
        match current {
            EditRequestStatus::Pending => Ok(ReviewAction::Approve {
                request_status: EditRequestStatus::Approved,
                expense_status: ExpenseStatus::Approved,
                reviewed_by,
                reviewed_at: Utc::now(),
            }),
            _ => Err(WorkflowError::InvalidState {
                from: current,
                attempted: EditRequestStatus::Approved,
            }),
        }
    }

    /// Rejects a pending edit request.
    ///
    /// The rejection reason is optional. The expense is parked at
    /// `RejectedEdit`; there is no automatic path back to `Approved`
    /// without a further admin update.
    ///
    /// # Arguments
    /// * `current` - The request's current status
    /// * `reviewed_by` - The admin rejecting the request
    /// * `rejection_reason` - Optional reason surfaced to the requester
    ///
    /// # Returns
    /// * `Ok(ReviewAction::Reject)` if the request is pending
    /// * `Err(WorkflowError::InvalidState)` otherwise
    pub fn reject(
        current: EditRequestStatus,
        reviewed_by: Uuid,
        rejection_reason: Option<String>,
    ) -> Result<ReviewAction, WorkflowError> {
        match current {
            EditRequestStatus::Pending => Ok(ReviewAction::Reject {
                request_status: EditRequestStatus::Rejected,
                expense_status: ExpenseStatus::RejectedEdit,
                reviewed_by,
                reviewed_at: Utc::now(),
                rejection_reason: rejection_reason.filter(|r| !r.trim().is_empty()),
            }),
            _ => Err(WorkflowError::InvalidState {
                from: current,
                attempted: EditRequestStatus::Rejected,
            }),
        }
    }

    /// Computes the expense status transition for a new staff edit request.
    ///
    /// Valid from `Approved` or `RejectedEdit`. An expense already in
    /// `PendingEdit` has an open request and may not receive another; the
    /// repository surfaces that as `DuplicatePendingEdit` before reaching
    /// this point, but the transition itself is also rejected here.
    pub fn request_edit(current: ExpenseStatus) -> Result<ExpenseStatus, WorkflowError> {
        match current {
            ExpenseStatus::Approved | ExpenseStatus::RejectedEdit => Ok(ExpenseStatus::PendingEdit),
            ExpenseStatus::PendingEdit => Err(WorkflowError::InvalidState {
                from: EditRequestStatus::Pending,
                attempted: EditRequestStatus::Pending,
            }),
        }
    }

    /// Checks if an edit-request status transition is valid.
    ///
    /// Valid transitions: Pending → Approved, Pending → Rejected.
    #[must_use]
    pub fn is_valid_request_transition(from: EditRequestStatus, to: EditRequestStatus) -> bool {
        matches!(
            (from, to),
            (
                EditRequestStatus::Pending,
                EditRequestStatus::Approved | EditRequestStatus::Rejected
            )
        )
    }

    /// Checks if an expense status transition is valid.
    ///
    /// Valid transitions:
    /// - Approved → PendingEdit (edit requested)
    /// - RejectedEdit → PendingEdit (edit requested after rejection)
    /// - PendingEdit → Approved (edit approved)
    /// - PendingEdit → RejectedEdit (edit rejected)
    #[must_use]
    pub fn is_valid_expense_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
        matches!(
            (from, to),
            (
                ExpenseStatus::Approved | ExpenseStatus::RejectedEdit,
                ExpenseStatus::PendingEdit
            ) | (
                ExpenseStatus::PendingEdit,
                ExpenseStatus::Approved | ExpenseStatus::RejectedEdit
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_from_pending() {
        let admin = Uuid::new_v4();
        let action = ReviewService::approve(EditRequestStatus::Pending, admin).unwrap();
        assert_eq!(action.request_status(), EditRequestStatus::Approved);
        assert_eq!(action.expense_status(), ExpenseStatus::Approved);

        if let ReviewAction::Approve { reviewed_by, .. } = action {
            assert_eq!(reviewed_by, admin);
        } else {
            panic!("Expected Approve action");
        }
    }

    #[test]
    fn test_approve_from_approved_fails() {
        let result = ReviewService::approve(EditRequestStatus::Approved, Uuid::new_v4());
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidState {
                from: EditRequestStatus::Approved,
                ..
            })
        ));
    }

    #[test]
    fn test_approve_from_rejected_fails() {
        let result = ReviewService::approve(EditRequestStatus::Rejected, Uuid::new_v4());
        assert!(matches!(result, Err(WorkflowError::InvalidState { .. })));
    }

    #[test]
    fn test_reject_from_pending() {
        let admin = Uuid::new_v4();
        let action = ReviewService::reject(
            EditRequestStatus::Pending,
            admin,
            Some("insufficient receipt".to_string()),
        )
        .unwrap();

        assert_eq!(action.request_status(), EditRequestStatus::Rejected);
        assert_eq!(action.expense_status(), ExpenseStatus::RejectedEdit);

        if let ReviewAction::Reject {
            rejection_reason, ..
        } = action
        {
            assert_eq!(rejection_reason.as_deref(), Some("insufficient receipt"));
        } else {
            panic!("Expected Reject action");
        }
    }

    #[test]
    fn test_reject_without_reason() {
        let action =
            ReviewService::reject(EditRequestStatus::Pending, Uuid::new_v4(), None).unwrap();
        if let ReviewAction::Reject {
            rejection_reason, ..
        } = action
        {
            assert!(rejection_reason.is_none());
        } else {
            panic!("Expected Reject action");
        }
    }

    #[test]
    fn test_reject_blank_reason_stored_as_none() {
        let action = ReviewService::reject(
            EditRequestStatus::Pending,
            Uuid::new_v4(),
            Some("   ".to_string()),
        )
        .unwrap();
        if let ReviewAction::Reject {
            rejection_reason, ..
        } = action
        {
            assert!(rejection_reason.is_none());
        } else {
            panic!("Expected Reject action");
        }
    }

    #[test]
    fn test_reject_from_terminal_fails() {
        for status in [EditRequestStatus::Approved, EditRequestStatus::Rejected] {
            let result = ReviewService::reject(status, Uuid::new_v4(), None);
            assert!(matches!(result, Err(WorkflowError::InvalidState { .. })));
        }
    }

    #[test]
    fn test_request_edit_from_approved() {
        assert_eq!(
            ReviewService::request_edit(ExpenseStatus::Approved).unwrap(),
            ExpenseStatus::PendingEdit
        );
    }

    #[test]
    fn test_request_edit_from_rejected_edit() {
        assert_eq!(
            ReviewService::request_edit(ExpenseStatus::RejectedEdit).unwrap(),
            ExpenseStatus::PendingEdit
        );
    }

    #[test]
    fn test_request_edit_while_pending_fails() {
        let result = ReviewService::request_edit(ExpenseStatus::PendingEdit);
        assert!(matches!(result, Err(WorkflowError::InvalidState { .. })));
    }

    #[test]
    fn test_is_valid_request_transition() {
        assert!(ReviewService::is_valid_request_transition(
            EditRequestStatus::Pending,
            EditRequestStatus::Approved
        ));
        assert!(ReviewService::is_valid_request_transition(
            EditRequestStatus::Pending,
            EditRequestStatus::Rejected
        ));

        assert!(!ReviewService::is_valid_request_transition(
            EditRequestStatus::Approved,
            EditRequestStatus::Rejected
        ));
        assert!(!ReviewService::is_valid_request_transition(
            EditRequestStatus::Rejected,
            EditRequestStatus::Pending
        ));
    }

    #[test]
    fn test_is_valid_expense_transition() {
        assert!(ReviewService::is_valid_expense_transition(
            ExpenseStatus::Approved,
            ExpenseStatus::PendingEdit
        ));
        assert!(ReviewService::is_valid_expense_transition(
            ExpenseStatus::RejectedEdit,
            ExpenseStatus::PendingEdit
        ));
        assert!(ReviewService::is_valid_expense_transition(
            ExpenseStatus::PendingEdit,
            ExpenseStatus::Approved
        ));
        assert!(ReviewService::is_valid_expense_transition(
            ExpenseStatus::PendingEdit,
            ExpenseStatus::RejectedEdit
        ));

        assert!(!ReviewService::is_valid_expense_transition(
            ExpenseStatus::Approved,
            ExpenseStatus::RejectedEdit
        ));
        assert!(!ReviewService::is_valid_expense_transition(
            ExpenseStatus::RejectedEdit,
            ExpenseStatus::Approved
        ));
    }
}
