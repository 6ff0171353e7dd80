//! Observability for the tagging passes
//!
//! - Structured JSON logging
//! - Typed lifecycle events
//! - Pass counters
//!
//! Observability is read-only: nothing here influences how a tree is
//! rewritten, and a failed log write is ignored.
//!
//! ```ignore
//! use aerodb_tagging::observability::{log_event_with_fields, Event, PassMetrics};
//!
//! log_event_with_fields(Event::TagPassBegin, &[("nodes", "12")]);
//!
//! let metrics = PassMetrics::new();
//! metrics.increment_passes();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, PassMetrics};
pub use scope::{ObservationScope, Timer};

/// Logs a lifecycle event with fields. Fatal events log at FATAL, the rest
/// at INFO.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event_with_fields(Event::TagPassBegin, &[]);
        log_event_with_fields(Event::ConfigLoaded, &[("path", "/tmp/tagging.json")]);
    }
}
