//! Ledger module - the append-only, per-event record of confirmed donations.

mod ledger_model;
mod ledger_service;
mod ledger_traits;
mod retry;


pub use ledger_model::{
    live_donations, CommittedEntry, ConfirmedDonation, LedgerAggregate, LedgerEntry, LedgerEntryKind,
    LedgerSnapshot, NewConfirmation, NewReversal,
};
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
pub use retry::{RetryClass, RetryPolicy};
