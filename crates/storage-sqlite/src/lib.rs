//! SQLite storage implementation for Pledgeboard.
//!
//! This crate is the only place where Diesel is used. It implements the
//! repository traits defined in `pledgeboard-core`:
//! - connection pooling, migrations and the single-writer actor
//! - event, draft and ledger repositories
//! - database row types and their conversions to domain types
//!
//! ```text
//! core (domain, traits)
//!        │
//!        ▼
//! storage-sqlite (this crate) ──► SQLite DB
//! ```
//!
//! All writes go through [`WriteHandle`], so the domain rules re-checked in
//! each write job see a consistent view of the event, its drafts and its
//! ledger.

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

// Repository implementations
pub mod drafts;
pub mod events;
pub mod ledger;

pub use db::{
    create_pool, get_connection, get_db_path, init, open, run_migrations, spawn_writer,
    DbConnection, DbPool, WriteHandle,
};
pub use drafts::DraftRepository;
pub use events::EventRepository;
pub use ledger::LedgerRepository;

pub use errors::{IntoCore, StorageError};

pub use pledgeboard_core::errors::{DatabaseError, Error, Result};
