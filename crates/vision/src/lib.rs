//! Vision-model extraction for Pledgeboard.
//!
//! Implements `pledgeboard_core::extraction::FormExtractor` against an
//! OpenAI-compatible chat-completions API. The extractor only ever proposes
//! candidate fields; validation and human confirmation happen in core.

mod errors;
mod extractor;
mod response;

pub use errors::VisionError;
pub use extractor::{
    resolve_image_path, OpenAiVisionExtractor, VisionConfig, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
pub use response::parse_form_reading;
