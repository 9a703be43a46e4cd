//! Intake - bounded extraction plus validation, producing stored drafts.

mod intake_service;


pub use intake_service::{IntakeService, IntakeServiceTrait};
