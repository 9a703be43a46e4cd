//! SQLite storage implementation for events.

mod model;
mod repository;

pub use model::EventDB;
pub(crate) use repository::load_event;
pub use repository::EventRepository;
