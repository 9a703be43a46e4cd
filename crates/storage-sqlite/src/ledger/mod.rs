//! SQLite storage implementation for the donation ledger.

mod model;
mod repository;

pub use model::{DonationDB, LedgerEntryDB};
pub(crate) use repository::load_entries;
pub use repository::LedgerRepository;
