//! Observability for pallas
//!
//! Structured JSON logging of typed lifecycle and operation events.
//!
//! ```ignore
//! use pallas::observability::{log_event, Event};
//!
//! log_event(Event::StoreOpened, &[("db", "users")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event at its default severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

/// Log an event at an explicit severity
pub fn log_event_at(severity: Severity, event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}
