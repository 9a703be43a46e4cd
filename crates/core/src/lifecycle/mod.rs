//! Event lifecycle - event state machine, start/stop and the final report hand-off.

mod lifecycle_model;
mod lifecycle_service;
mod lifecycle_traits;


pub use lifecycle_model::{Event, EventState, FinalLedger, NewEvent, StoppedEvent};
pub use lifecycle_service::LifecycleService;
pub use lifecycle_traits::{EventRepositoryTrait, LifecycleServiceTrait};
