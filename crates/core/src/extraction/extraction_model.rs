//! Extraction domain models.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw candidate fields read off a pledge form. Never trusted directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub raw_name: String,
    pub raw_amount: String,
}

impl ExtractedFields {
    pub fn new(raw_name: impl Into<String>, raw_amount: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            raw_amount: raw_amount.into(),
        }
    }
}

/// Per-field confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfidence {
    pub name: f64,
    pub amount: f64,
}

impl FieldConfidence {
    pub fn new(name: f64, amount: f64) -> Self {
        Self {
            name: clamp_confidence(name),
            amount: clamp_confidence(amount),
        }
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Why an extraction produced no usable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionFailureKind {
    Timeout,
    Unavailable,
    MalformedResponse,
    ImageUnreadable,
}

impl ExtractionFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionFailureKind::Timeout => "TIMEOUT",
            ExtractionFailureKind::Unavailable => "UNAVAILABLE",
            ExtractionFailureKind::MalformedResponse => "MALFORMED_RESPONSE",
            ExtractionFailureKind::ImageUnreadable => "IMAGE_UNREADABLE",
        }
    }
}

impl std::fmt::Display for ExtractionFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExtractionFailureKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "TIMEOUT" => Ok(ExtractionFailureKind::Timeout),
            "UNAVAILABLE" => Ok(ExtractionFailureKind::Unavailable),
            "MALFORMED_RESPONSE" => Ok(ExtractionFailureKind::MalformedResponse),
            "IMAGE_UNREADABLE" => Ok(ExtractionFailureKind::ImageUnreadable),
            other => Err(format!("unknown extraction failure kind: {other}")),
        }
    }
}

/// Extraction failure with a human-readable detail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct ExtractionFailure {
    pub kind: ExtractionFailureKind,
    pub detail: String,
}

impl ExtractionFailure {
    pub fn new(kind: ExtractionFailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Tagged result of one extraction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Success {
        fields: ExtractedFields,
        confidence: FieldConfidence,
    },
    Failure(ExtractionFailure),
}

impl ExtractionOutcome {
    pub fn success(fields: ExtractedFields, confidence: FieldConfidence) -> Self {
        ExtractionOutcome::Success { fields, confidence }
    }

    pub fn failure(kind: ExtractionFailureKind, detail: impl Into<String>) -> Self {
        ExtractionOutcome::Failure(ExtractionFailure::new(kind, detail))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        let c = FieldConfidence::new(1.4, f64::NAN);
        assert_eq!(c.name, 1.0);
        assert_eq!(c.amount, 0.0);
    }

    #[test]
    fn test_failure_kind_round_trips_through_str() {
        for kind in [
            ExtractionFailureKind::Timeout,
            ExtractionFailureKind::Unavailable,
            ExtractionFailureKind::MalformedResponse,
            ExtractionFailureKind::ImageUnreadable,
        ] {
            assert_eq!(kind.as_str().parse::<ExtractionFailureKind>(), Ok(kind));
        }
        assert!("NOPE".parse::<ExtractionFailureKind>().is_err());
    }
}
