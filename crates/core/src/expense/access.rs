//! Role model and access-control gates.
//!
//! Every operation in the expense domain begins by invoking exactly one of
//! the gates below. The gates are pure predicate checks with no side
//! effects; they run before any data access.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::expense::error::WorkflowError;

/// Caller role.
///
/// `Staff` is a first-class role value: expense features are available to
/// staff and admins, while only admins may mutate categories, delete
/// expenses, or review edit requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access: direct expense edits, category management, reviews.
    Admin,
    /// Can create expenses and propose edits for admin review.
    Staff,
    /// Storefront user; no access to expense features.
    Customer,
}

impl Role {
    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Customer => "customer",
        }
    }

    /// Returns true for the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticated caller identity, supplied by the external auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// The caller's user id.
    pub user_id: Uuid,
    /// The caller's role.
    pub role: Role,
}

impl Caller {
    /// Creates a new caller.
    #[must_use]
    pub const fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Requires any authenticated caller.
///
/// # Errors
///
/// Returns `WorkflowError::Unauthorized` when no caller identity exists.
pub fn require_authenticated(caller: Option<&Caller>) -> Result<&Caller, WorkflowError> {
    caller.ok_or(WorkflowError::Unauthorized)
}

/// Requires a caller allowed to use expense features (staff or admin).
///
/// # Errors
///
/// Returns `WorkflowError::Unauthorized` when no caller identity exists,
/// or `WorkflowError::Forbidden` when the caller is a customer.
pub fn require_expense_access(caller: Option<&Caller>) -> Result<&Caller, WorkflowError> {
    let caller = require_authenticated(caller)?;
    match caller.role {
        Role::Admin | Role::Staff => Ok(caller),
        Role::Customer => Err(WorkflowError::Forbidden {
            role: caller.role,
            required: "staff or admin".to_string(),
        }),
    }
}

/// Requires an admin caller.
///
/// # Errors
///
/// Returns `WorkflowError::Unauthorized` when no caller identity exists,
/// or `WorkflowError::Forbidden` when the caller is not an admin.
pub fn require_admin_access(caller: Option<&Caller>) -> Result<&Caller, WorkflowError> {
    let caller = require_authenticated(caller)?;
    if caller.role.is_admin() {
        Ok(caller)
    } else {
        Err(WorkflowError::Forbidden {
            role: caller.role,
            required: "admin".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Role) -> Caller {
        Caller::new(Uuid::new_v4(), role)
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("STAFF"), Some(Role::Staff));
        assert_eq!(Role::parse("Customer"), Some(Role::Customer));
        assert_eq!(Role::parse("owner"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Staff.as_str(), "staff");
        assert_eq!(Role::Customer.as_str(), "customer");
    }

    #[test]
    fn test_require_authenticated_anonymous_fails() {
        let result = require_authenticated(None);
        assert!(matches!(result, Err(WorkflowError::Unauthorized)));
    }

    #[test]
    fn test_require_authenticated_any_role_passes() {
        for role in [Role::Admin, Role::Staff, Role::Customer] {
            let c = caller(role);
            assert!(require_authenticated(Some(&c)).is_ok());
        }
    }

    #[test]
    fn test_require_expense_access_customer_forbidden() {
        let c = caller(Role::Customer);
        let result = require_expense_access(Some(&c));
        assert!(matches!(result, Err(WorkflowError::Forbidden { .. })));
    }

    #[test]
    fn test_require_expense_access_staff_and_admin_pass() {
        for role in [Role::Admin, Role::Staff] {
            let c = caller(role);
            assert!(require_expense_access(Some(&c)).is_ok());
        }
    }

    #[test]
    fn test_require_expense_access_anonymous_unauthorized() {
        assert!(matches!(
            require_expense_access(None),
            Err(WorkflowError::Unauthorized)
        ));
    }

    #[test]
    fn test_require_admin_access_non_admin_forbidden() {
        for role in [Role::Staff, Role::Customer] {
            let c = caller(role);
            let result = require_admin_access(Some(&c));
            assert!(matches!(result, Err(WorkflowError::Forbidden { .. })));
        }
    }

    #[test]
    fn test_require_admin_access_admin_passes() {
        let c = caller(Role::Admin);
        assert_eq!(require_admin_access(Some(&c)).unwrap().user_id, c.user_id);
    }
}
