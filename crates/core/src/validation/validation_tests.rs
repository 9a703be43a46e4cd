//! Tests for the validation stage as a whole.

use rust_decimal_macros::dec;

use super::*;
use crate::errors::ValidationError;
use crate::extraction::{ExtractedFields, FieldConfidence};

#[test]
fn test_valid_fields_produce_clean_report() {
    let validator = FieldValidator::default();
    let report = validator.assess(
        &ExtractedFields::new("alice", "$100"),
        Some(FieldConfidence::new(0.9, 0.95)),
    );

    assert!(report.is_valid());
    assert_eq!(report.donor_name.as_deref(), Some("Alice"));
    assert_eq!(report.amount, Some(dec!(100.00)));
    assert!(!report.flags.any());
}

#[test]
fn test_all_issues_are_reported_together() {
    let validator = FieldValidator::default();
    let report = validator.assess(&ExtractedFields::new("   ", "-5"), None);

    assert!(!report.is_valid());
    let issues = report.issues();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].field, DraftField::DonorName);
    assert_eq!(issues[0].code, "MISSING_NAME");
    assert_eq!(issues[1].field, DraftField::Amount);
    assert_eq!(issues[1].code, "INVALID_AMOUNT");
}

#[test]
fn test_low_confidence_flags_each_field_independently() {
    let validator = FieldValidator::new(0.6);
    let report = validator.assess(
        &ExtractedFields::new("Bob", "50"),
        Some(FieldConfidence::new(0.59, 0.6)),
    );

    assert!(report.is_valid());
    assert!(report.flags.name_low_confidence);
    assert!(!report.flags.amount_low_confidence);
}

#[test]
fn test_low_confidence_does_not_block_validation() {
    let validator = FieldValidator::new(0.9);
    let fields = validator
        .assess(
            &ExtractedFields::new("Carol", "20"),
            Some(FieldConfidence::new(0.1, 0.1)),
        )
        .into_validated()
        .unwrap();
    assert_eq!(fields.donor_name, "Carol");
    assert_eq!(fields.amount, dec!(20));
}

#[test]
fn test_validate_returns_first_error() {
    let validator = FieldValidator::default();
    assert_eq!(
        validator.validate("", "abc"),
        Err(ValidationError::MissingName)
    );
    assert!(matches!(
        validator.validate("Dana", "abc"),
        Err(ValidationError::InvalidAmount(_))
    ));
}

#[test]
fn test_flags_serialize_camel_case() {
    let flags = FieldFlags {
        name_low_confidence: true,
        amount_low_confidence: false,
    };
    let json = serde_json::to_value(flags).unwrap();
    assert_eq!(json["nameLowConfidence"], true);
    assert_eq!(json["amountLowConfidence"], false);
}
