//! Input validation for expense payloads.
//!
//! Validation runs at the boundary before any data access; every rule
//! raises `WorkflowError::Validation` with a human-readable message.

use rust_decimal::Decimal;

use crate::expense::error::WorkflowError;
use crate::expense::types::ProposedChanges;

/// Validates an expense title: required and non-empty after trimming.
pub fn validate_title(title: &str) -> Result<(), WorkflowError> {
    if title.trim().is_empty() {
        return Err(WorkflowError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates an expense amount: strictly positive.
pub fn validate_amount(amount: Decimal) -> Result<(), WorkflowError> {
    if amount <= Decimal::ZERO {
        return Err(WorkflowError::Validation(
            "amount must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Validates a category name: required and non-empty after trimming.
pub fn validate_category_name(name: &str) -> Result<(), WorkflowError> {
    if name.trim().is_empty() {
        return Err(WorkflowError::Validation(
            "category name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates a proposed-changes payload.
///
/// The payload must change at least one field, and any field it does set
/// must satisfy the same rules as a direct write.
pub fn validate_proposed_changes(changes: &ProposedChanges) -> Result<(), WorkflowError> {
    if changes.is_empty() {
        return Err(WorkflowError::Validation(
            "update must change at least one field".to_string(),
        ));
    }
    if let Some(title) = &changes.title {
        validate_title(title)?;
    }
    if let Some(amount) = changes.amount {
        validate_amount(amount)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("", false)]
    #[case("   ", false)]
    #[case("Printer Paper", true)]
    fn test_title_rules(#[case] title: &str, #[case] valid: bool) {
        assert_eq!(validate_title(title).is_ok(), valid);
    }

    #[rstest]
    #[case(dec!(0), false)]
    #[case(dec!(-1.50), false)]
    #[case(dec!(0.01), true)]
    #[case(dec!(45.00), true)]
    fn test_amount_must_be_positive(#[case] amount: Decimal, #[case] valid: bool) {
        assert_eq!(validate_amount(amount).is_ok(), valid);
    }

    #[rstest]
    #[case("", false)]
    #[case("\t", false)]
    #[case("Office Supplies", true)]
    fn test_category_name_rules(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(validate_category_name(name).is_ok(), valid);
    }

    #[test]
    fn test_proposed_changes_must_not_be_empty() {
        let result = validate_proposed_changes(&ProposedChanges::default());
        assert!(matches!(result, Err(WorkflowError::Validation(_))));
    }

    #[test]
    fn test_proposed_changes_field_rules_apply() {
        let changes = ProposedChanges {
            amount: Some(dec!(-5)),
            ..Default::default()
        };
        assert!(validate_proposed_changes(&changes).is_err());

        let changes = ProposedChanges {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(validate_proposed_changes(&changes).is_err());

        let changes = ProposedChanges {
            amount: Some(dec!(50.00)),
            ..Default::default()
        };
        assert!(validate_proposed_changes(&changes).is_ok());
    }
}
