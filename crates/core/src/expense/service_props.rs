//! Property-based tests for ReviewService.
//!
//! Randomized checks that the state machine only ever resolves pending
//! requests, keeps the expense status mirror consistent, and agrees with
//! the transition predicates.

use proptest::prelude::*;
use uuid::Uuid;

use crate::expense::error::WorkflowError;
use crate::expense::service::ReviewService;
use crate::expense::types::{EditRequestStatus, ExpenseStatus, ReviewAction};

/// Strategy for generating random EditRequestStatus values.
fn arb_request_status() -> impl Strategy<Value = EditRequestStatus> {
    prop_oneof![
        Just(EditRequestStatus::Pending),
        Just(EditRequestStatus::Approved),
        Just(EditRequestStatus::Rejected),
    ]
}

/// Strategy for generating random ExpenseStatus values.
fn arb_expense_status() -> impl Strategy<Value = ExpenseStatus> {
    prop_oneof![
        Just(ExpenseStatus::Approved),
        Just(ExpenseStatus::PendingEdit),
        Just(ExpenseStatus::RejectedEdit),
    ]
}

/// Strategy for generating random UUIDs.
fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

/// Strategy for generating optional rejection reasons.
fn arb_reason() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), "[a-zA-Z0-9 ]{1,80}".prop_map(Some)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Pending + approve → request Approved, expense restored to Approved.
    #[test]
    fn prop_approve_from_pending_succeeds(admin in arb_uuid()) {
        let action = ReviewService::approve(EditRequestStatus::Pending, admin);
        prop_assert!(action.is_ok());
        let action = action.unwrap();
        prop_assert_eq!(action.request_status(), EditRequestStatus::Approved);
        prop_assert_eq!(action.expense_status(), ExpenseStatus::Approved);

        if let ReviewAction::Approve { reviewed_by, .. } = action {
            prop_assert_eq!(reviewed_by, admin);
        } else {
            prop_assert!(false, "Expected Approve action");
        }
    }

    /// Pending + reject → request Rejected, expense parked at RejectedEdit.
    #[test]
    fn prop_reject_from_pending_succeeds(admin in arb_uuid(), reason in arb_reason()) {
        let action = ReviewService::reject(EditRequestStatus::Pending, admin, reason.clone());
        prop_assert!(action.is_ok());
        let action = action.unwrap();
        prop_assert_eq!(action.request_status(), EditRequestStatus::Rejected);
        prop_assert_eq!(action.expense_status(), ExpenseStatus::RejectedEdit);

        if let ReviewAction::Reject { reviewed_by, rejection_reason, .. } = action {
            prop_assert_eq!(reviewed_by, admin);
            // Blank reasons are normalized to None, non-blank kept verbatim.
            match &reason {
                Some(r) if !r.trim().is_empty() => prop_assert_eq!(rejection_reason, reason),
                _ => prop_assert!(rejection_reason.is_none()),
            }
        } else {
            prop_assert!(false, "Expected Reject action");
        }
    }

    /// Resolving a non-pending request always fails with InvalidState.
    #[test]
    fn prop_resolve_non_pending_fails(
        status in arb_request_status(),
        admin in arb_uuid(),
        reason in arb_reason()
    ) {
        prop_assume!(status != EditRequestStatus::Pending);

        let approve = ReviewService::approve(status, admin);
        prop_assert!(
            matches!(approve, Err(WorkflowError::InvalidState { from, .. }) if from == status),
            "expected InvalidState from {:?} on approve",
            status
        );

        let reject = ReviewService::reject(status, admin, reason);
        prop_assert!(
            matches!(reject, Err(WorkflowError::InvalidState { from, .. }) if from == status),
            "expected InvalidState from {:?} on reject",
            status
        );
    }

    /// Double resolution is always rejected: the first action's resulting
    /// status is terminal, and resolving from it fails.
    #[test]
    fn prop_double_resolution_rejected(admin in arb_uuid(), reason in arb_reason()) {
        let first = ReviewService::approve(EditRequestStatus::Pending, admin).unwrap();
        let after = first.request_status();
        prop_assert!(after.is_terminal());
        prop_assert!(ReviewService::approve(after, admin).is_err());
        prop_assert!(ReviewService::reject(after, admin, reason).is_err());
    }

    /// is_valid_request_transition agrees with the service functions.
    #[test]
    fn prop_request_transition_consistency(
        from in arb_request_status(),
        admin in arb_uuid()
    ) {
        let approve_ok = ReviewService::approve(from, admin).is_ok();
        prop_assert_eq!(
            approve_ok,
            ReviewService::is_valid_request_transition(from, EditRequestStatus::Approved)
        );

        let reject_ok = ReviewService::reject(from, admin, None).is_ok();
        prop_assert_eq!(
            reject_ok,
            ReviewService::is_valid_request_transition(from, EditRequestStatus::Rejected)
        );
    }

    /// request_edit agrees with is_valid_expense_transition.
    #[test]
    fn prop_request_edit_consistency(from in arb_expense_status()) {
        let allowed = ReviewService::request_edit(from).is_ok();
        prop_assert_eq!(
            allowed,
            ReviewService::is_valid_expense_transition(from, ExpenseStatus::PendingEdit)
        );
    }
}

#[cfg(test)]
mod edge_case_tests {
    use super::*;

    /// Full 3x3 matrix for the edit-request transitions.
    #[test]
    fn test_request_transition_all_combinations() {
        let statuses = [
            EditRequestStatus::Pending,
            EditRequestStatus::Approved,
            EditRequestStatus::Rejected,
        ];

        let valid = [
            (EditRequestStatus::Pending, EditRequestStatus::Approved),
            (EditRequestStatus::Pending, EditRequestStatus::Rejected),
        ];

        for from in &statuses {
            for to in &statuses {
                let got = ReviewService::is_valid_request_transition(*from, *to);
                let expected = valid.contains(&(*from, *to));
                assert_eq!(
                    got, expected,
                    "is_valid_request_transition({from:?}, {to:?}) = {got}, expected {expected}"
                );
            }
        }
    }

    /// Full 3x3 matrix for the expense-status transitions.
    #[test]
    fn test_expense_transition_all_combinations() {
        let statuses = [
            ExpenseStatus::Approved,
            ExpenseStatus::PendingEdit,
            ExpenseStatus::RejectedEdit,
        ];

        let valid = [
            (ExpenseStatus::Approved, ExpenseStatus::PendingEdit),
            (ExpenseStatus::RejectedEdit, ExpenseStatus::PendingEdit),
            (ExpenseStatus::PendingEdit, ExpenseStatus::Approved),
            (ExpenseStatus::PendingEdit, ExpenseStatus::RejectedEdit),
        ];

        for from in &statuses {
            for to in &statuses {
                let got = ReviewService::is_valid_expense_transition(*from, *to);
                let expected = valid.contains(&(*from, *to));
                assert_eq!(
                    got, expected,
                    "is_valid_expense_transition({from:?}, {to:?}) = {got}, expected {expected}"
                );
            }
        }
    }

    /// Same-status transitions are never valid.
    #[test]
    fn test_same_status_transitions_invalid() {
        for status in [
            EditRequestStatus::Pending,
            EditRequestStatus::Approved,
            EditRequestStatus::Rejected,
        ] {
            assert!(!ReviewService::is_valid_request_transition(status, status));
        }
        for status in [
            ExpenseStatus::Approved,
            ExpenseStatus::PendingEdit,
            ExpenseStatus::RejectedEdit,
        ] {
            assert!(!ReviewService::is_valid_expense_transition(status, status));
        }
    }
}
