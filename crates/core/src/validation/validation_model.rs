//! Validation domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// A draft field that can carry an issue or a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    DonorName,
    Amount,
}

/// Advisory highlights for the reviewer. They never block confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFlags {
    pub name_low_confidence: bool,
    pub amount_low_confidence: bool,
}

impl FieldFlags {
    pub fn any(&self) -> bool {
        self.name_low_confidence || self.amount_low_confidence
    }
}

/// Serializable form of a validation error attached to a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub field: DraftField,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn from_error(field: DraftField, error: &ValidationError) -> Self {
        Self {
            field,
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Donor fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFields {
    pub donor_name: String,
    pub amount: Decimal,
}

/// Outcome of validating both fields, with every problem collected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub donor_name: Option<String>,
    pub amount: Option<Decimal>,
    pub errors: Vec<(DraftField, ValidationError)>,
    pub flags: FieldFlags,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn issues(&self) -> Vec<ValidationIssue> {
        self.errors
            .iter()
            .map(|(field, error)| ValidationIssue::from_error(*field, error))
            .collect()
    }

    /// Returns the validated fields, or the first error found.
    pub fn into_validated(self) -> Result<ValidatedFields, ValidationError> {
        if let Some((_, error)) = self.errors.into_iter().next() {
            return Err(error);
        }
        match (self.donor_name, self.amount) {
            (Some(donor_name), Some(amount)) => Ok(ValidatedFields { donor_name, amount }),
            (None, _) => Err(ValidationError::MissingName),
            (_, None) => Err(ValidationError::InvalidAmount(
                "amount is missing".to_string(),
            )),
        }
    }
}
