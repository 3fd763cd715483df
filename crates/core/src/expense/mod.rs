//! Expense ledger domain logic.
//!
//! This module implements the expense edit-request state machine, the role
//! model and access-control gates, and validation of expense payloads. The
//! persistence and transport layers consume these rules; nothing in here
//! performs I/O.

pub mod access;
pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use access::{Caller, Role, require_admin_access, require_authenticated, require_expense_access};
pub use error::WorkflowError;
pub use service::ReviewService;
pub use types::{EditRequestStatus, ExpenseStatus, ProposedChanges, ReviewAction};
