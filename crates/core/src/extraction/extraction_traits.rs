//! Extraction adapter trait.

use async_trait::async_trait;

use super::extraction_model::ExtractionOutcome;

/// Reads candidate donor fields from a stored form image.
///
/// Implementations never return an error: every problem is reported as
/// `ExtractionOutcome::Failure` so intake can fall back to manual entry.
/// Callers bound each call with their own timeout.
#[async_trait]
pub trait FormExtractor: Send + Sync {
    async fn extract(&self, image_ref: &str) -> ExtractionOutcome;
}
