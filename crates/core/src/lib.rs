//! Pledgeboard Core - Domain entities, services, and traits.
//!
//! This crate contains the donation intake pipeline: extraction, validation,
//! review, confirmation, the per-event ledger and the live sync broadcaster.
//! It is database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate.

pub mod confirmation;
pub mod constants;
pub mod drafts;
pub mod errors;
pub mod events;
pub mod export;
pub mod extraction;
pub mod intake;
pub mod ledger;
pub mod lifecycle;
pub mod live_sync;
pub mod settings;
pub mod validation;

#[cfg(test)]
mod test_support;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
