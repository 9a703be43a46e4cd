use super::amount::parse_amount;
use super::name::normalize_name;
use super::validation_model::{DraftField, FieldFlags, ValidatedFields, ValidationReport};
use crate::constants::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::errors::ValidationError;
use crate::extraction::{ExtractedFields, FieldConfidence};

/// Stateless validation stage shared by submission and confirmation.
#[derive(Debug, Clone, Copy)]
pub struct FieldValidator {
    confidence_threshold: f64,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl FieldValidator {
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
        }
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Checks both fields and collects every issue. Confidence, when present,
    /// only sets flags.
    pub fn assess(
        &self,
        fields: &ExtractedFields,
        confidence: Option<FieldConfidence>,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        match normalize_name(&fields.raw_name) {
            Ok(name) => report.donor_name = Some(name),
            Err(e) => report.errors.push((DraftField::DonorName, e)),
        }
        match parse_amount(&fields.raw_amount) {
            Ok(amount) => report.amount = Some(amount),
            Err(e) => report.errors.push((DraftField::Amount, e)),
        }

        if let Some(confidence) = confidence {
            report.flags = FieldFlags {
                name_low_confidence: confidence.name < self.confidence_threshold,
                amount_low_confidence: confidence.amount < self.confidence_threshold,
            };
        }

        report
    }

    /// Validates human-edited fields, failing on the first issue.
    pub fn validate(
        &self,
        donor_name: &str,
        amount: &str,
    ) -> Result<ValidatedFields, ValidationError> {
        self.assess(&ExtractedFields::new(donor_name, amount), None)
            .into_validated()
    }
}
