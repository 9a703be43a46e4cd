//! Drafts module - donation drafts and the review queue.

mod drafts_model;
mod drafts_traits;
mod editor_sessions;
mod review_queue_service;


pub use drafts_model::{DonationDraft, DraftStatus, DraftTransition, OpenedDraft};
pub use drafts_traits::{DraftRepositoryTrait, ReviewQueueServiceTrait};
pub use editor_sessions::EditorSessions;
pub use review_queue_service::ReviewQueueService;
