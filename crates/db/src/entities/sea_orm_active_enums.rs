//! Database enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role, mirrors the `user_role` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access including edit-request review.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Expense features; edits go through admin review.
    #[sea_orm(string_value = "staff")]
    Staff,
    /// Storefront user; no expense access.
    #[sea_orm(string_value = "customer")]
    Customer,
}

/// Expense status, mirrors the `expense_status` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_status")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    /// Approved and current.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// An edit request is awaiting review.
    #[sea_orm(string_value = "pending_edit")]
    PendingEdit,
    /// Last edit rejected (also the soft-delete marker).
    #[sea_orm(string_value = "rejected_edit")]
    RejectedEdit,
}

/// Edit request status, mirrors the `edit_request_status` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "edit_request_status")]
#[serde(rename_all = "lowercase")]
pub enum EditRequestStatus {
    /// Awaiting admin review.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved and applied.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected without applying.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}
