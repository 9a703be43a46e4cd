//! Extraction stage - the opaque form-reading adapter and its outcome types.

mod extraction_model;
mod extraction_traits;

pub use extraction_model::{
    ExtractedFields, ExtractionFailure, ExtractionFailureKind, ExtractionOutcome, FieldConfidence,
};
pub use extraction_traits::FormExtractor;
