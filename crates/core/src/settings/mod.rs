//! Typed runtime settings for the intake pipeline.

mod intake_settings;

pub use intake_settings::IntakeSettings;
