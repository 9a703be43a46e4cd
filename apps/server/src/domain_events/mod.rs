//! Domain events runtime bridge for the web server.
//!
//! Receives domain events from core services, records them in the trace log
//! and forwards them to the live sync broadcaster.

mod sink;

pub use sink::WebDomainEventSink;
