//! Validation stage - amount parsing, name normalization and confidence flags.

mod amount;
mod name;
mod validation_model;
mod validator;

#[cfg(test)]
mod validation_tests;

pub use amount::parse_amount;
pub use name::{normalize_name, require_editor_id};
pub use validation_model::{
    DraftField, FieldFlags, ValidatedFields, ValidationIssue, ValidationReport,
};
pub use validator::FieldValidator;
