//! SQLite storage implementation for donation drafts.

mod model;
mod repository;

pub use model::DonationDraftDB;
pub(crate) use repository::{load_draft, save_draft};
pub use repository::DraftRepository;
