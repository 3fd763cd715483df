//! Expense domain types.
//!
//! This module defines the status enums for expenses and edit requests,
//! the proposed-changes payload, and the review action produced by the
//! state machine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Visible status of an expense record.
///
/// An expense is `Approved` immediately upon creation; there is no draft
/// state. The valid transitions are:
/// - Approved → PendingEdit (staff requests an edit)
/// - RejectedEdit → PendingEdit (staff requests an edit after a rejection)
/// - PendingEdit → Approved (admin approves the edit)
/// - PendingEdit → RejectedEdit (admin rejects the edit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    /// Expense is approved and current.
    Approved,
    /// A staff edit request is awaiting admin review.
    PendingEdit,
    /// The last edit request was rejected (also doubles as the soft-delete
    /// marker, preserved from the original contract).
    RejectedEdit,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::PendingEdit => "pending_edit",
            Self::RejectedEdit => "rejected_edit",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "approved" => Some(Self::Approved),
            "pending_edit" => Some(Self::PendingEdit),
            "rejected_edit" => Some(Self::RejectedEdit),
            _ => None,
        }
    }

    /// Returns true while an edit request is awaiting review.
    #[must_use]
    pub fn has_pending_edit(&self) -> bool {
        matches!(self, Self::PendingEdit)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of an edit request.
///
/// Requests are created `Pending` and resolve exactly once to `Approved`
/// or `Rejected`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditRequestStatus {
    /// Awaiting admin review.
    Pending,
    /// Approved and applied to the expense.
    Approved,
    /// Rejected; the expense was parked at rejected_edit.
    Rejected,
}

impl EditRequestStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true once the request has been resolved.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for EditRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Partial-update payload proposed by a staff edit request.
///
/// Every field is optional; an omitted field leaves the expense attribute
/// unchanged when the request is approved. Serialized to JSONB for storage
/// with omitted fields skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposedChanges {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// New receipt URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    /// New expense date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_date: Option<NaiveDate>,
    /// New category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

impl ProposedChanges {
    /// Returns true when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.amount.is_none()
            && self.receipt_url.is_none()
            && self.expense_date.is_none()
            && self.category_id.is_none()
    }
}

/// Review action representing a resolved edit request with audit data.
///
/// Each variant captures the resulting request status, the mirrored expense
/// status, and who reviewed when. The persistence layer applies both status
/// writes in a single transaction.
#[derive(Debug, Clone)]
pub enum ReviewAction {
    /// Approve the edit request and apply the proposed changes.
    Approve {
        /// New status for the edit request.
        request_status: EditRequestStatus,
        /// New status for the expense (restored to approved).
        expense_status: ExpenseStatus,
        /// The admin who reviewed the request.
        reviewed_by: Uuid,
        /// When the request was reviewed.
        reviewed_at: DateTime<Utc>,
    },
    /// Reject the edit request without applying the changes.
    Reject {
        /// New status for the edit request.
        request_status: EditRequestStatus,
        /// New status for the expense (parked at rejected_edit).
        expense_status: ExpenseStatus,
        /// The admin who reviewed the request.
        reviewed_by: Uuid,
        /// When the request was reviewed.
        reviewed_at: DateTime<Utc>,
        /// Optional reason given to the requester.
        rejection_reason: Option<String>,
    },
}

impl ReviewAction {
    /// Returns the new edit-request status resulting from this action.
    #[must_use]
    pub fn request_status(&self) -> EditRequestStatus {
        match self {
            Self::Approve { request_status, .. } | Self::Reject { request_status, .. } => {
                *request_status
            }
        }
    }

    /// Returns the new expense status resulting from this action.
    #[must_use]
    pub fn expense_status(&self) -> ExpenseStatus {
        match self {
            Self::Approve { expense_status, .. } | Self::Reject { expense_status, .. } => {
                *expense_status
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_expense_status_as_str() {
        assert_eq!(ExpenseStatus::Approved.as_str(), "approved");
        assert_eq!(ExpenseStatus::PendingEdit.as_str(), "pending_edit");
        assert_eq!(ExpenseStatus::RejectedEdit.as_str(), "rejected_edit");
    }

    #[test]
    fn test_expense_status_parse() {
        assert_eq!(
            ExpenseStatus::parse("approved"),
            Some(ExpenseStatus::Approved)
        );
        assert_eq!(
            ExpenseStatus::parse("PENDING_EDIT"),
            Some(ExpenseStatus::PendingEdit)
        );
        assert_eq!(
            ExpenseStatus::parse("Rejected_Edit"),
            Some(ExpenseStatus::RejectedEdit)
        );
        assert_eq!(ExpenseStatus::parse("draft"), None);
    }

    #[test]
    fn test_edit_request_status_terminal() {
        assert!(!EditRequestStatus::Pending.is_terminal());
        assert!(EditRequestStatus::Approved.is_terminal());
        assert!(EditRequestStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_edit_request_status_parse() {
        assert_eq!(
            EditRequestStatus::parse("pending"),
            Some(EditRequestStatus::Pending)
        );
        assert_eq!(
            EditRequestStatus::parse("APPROVED"),
            Some(EditRequestStatus::Approved)
        );
        assert_eq!(EditRequestStatus::parse("voided"), None);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", ExpenseStatus::PendingEdit), "pending_edit");
        assert_eq!(format!("{}", EditRequestStatus::Rejected), "rejected");
    }

    #[test]
    fn test_proposed_changes_empty() {
        assert!(ProposedChanges::default().is_empty());

        let changes = ProposedChanges {
            amount: Some(dec!(50.00)),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_proposed_changes_serde_skips_unset_fields() {
        let changes = ProposedChanges {
            amount: Some(dec!(50.00)),
            ..Default::default()
        };

        let json = serde_json::to_value(&changes).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("amount"));
        assert!(!obj.contains_key("title"));
        assert!(!obj.contains_key("expense_date"));

        let back: ProposedChanges = serde_json::from_value(json).unwrap();
        assert_eq!(back, changes);
    }
}
