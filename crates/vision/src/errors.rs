//! Errors raised while talking to the vision service.

use pledgeboard_core::extraction::{ExtractionFailure, ExtractionFailureKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    /// No API key configured. Intake keeps working; every draft goes to
    /// manual entry.
    #[error("Vision API key is not configured")]
    MissingApiKey,

    #[error("Vision request timed out")]
    Timeout,

    #[error("Vision service returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Vision request failed: {0}")]
    Transport(String),

    #[error("Image {image_ref} unreadable: {reason}")]
    ImageUnreadable { image_ref: String, reason: String },

    #[error("Malformed vision response: {0}")]
    MalformedResponse(String),
}

impl VisionError {
    /// How the intake pipeline should classify this failure.
    pub fn failure_kind(&self) -> ExtractionFailureKind {
        match self {
            VisionError::Timeout => ExtractionFailureKind::Timeout,
            VisionError::MissingApiKey | VisionError::Http { .. } | VisionError::Transport(_) => {
                ExtractionFailureKind::Unavailable
            }
            VisionError::ImageUnreadable { .. } => ExtractionFailureKind::ImageUnreadable,
            VisionError::MalformedResponse(_) => ExtractionFailureKind::MalformedResponse,
        }
    }
}

impl From<reqwest::Error> for VisionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VisionError::Timeout
        } else if err.is_decode() {
            VisionError::MalformedResponse(err.to_string())
        } else {
            VisionError::Transport(err.to_string())
        }
    }
}

impl From<VisionError> for ExtractionFailure {
    fn from(err: VisionError) -> Self {
        ExtractionFailure {
            kind: err.failure_kind(),
            detail: err.to_string(),
        }
    }
}
