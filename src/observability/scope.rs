//! Begin/complete logging around one unit of work
//!
//! - Logs the begin event on creation
//! - Logs the complete event, with elapsed time, on `complete`
//! - Logs `{begin}_INCOMPLETE` at WARN if dropped without completing
//!   (e.g. while unwinding from a contract violation)

use std::time::Instant;

use super::events::Event;
use super::logger::Logger;

/// Logging scope for one pass
pub struct ObservationScope {
    begin: Event,
    complete: Event,
    fields: Vec<(&'static str, String)>,
    enabled: bool,
    completed: bool,
    timer: Timer,
}

impl ObservationScope {
    /// Opens a scope; logs `begin` when `enabled`
    pub fn new(
        begin: Event,
        complete: Event,
        fields: Vec<(&'static str, String)>,
        enabled: bool,
    ) -> Self {
        if enabled {
            Logger::info(begin.as_str(), &borrow_fields(&fields));
        }
        Self {
            begin,
            complete,
            fields,
            enabled,
            completed: false,
            timer: Timer::new(),
        }
    }

    /// Closes the scope, logging the complete event with `extra` fields
    pub fn complete(mut self, extra: &[(&str, &str)]) {
        self.completed = true;
        if !self.enabled {
            return;
        }
        let elapsed = self.timer.elapsed_us();
        let mut fields = borrow_fields(&self.fields);
        fields.extend(extra.iter().copied());
        fields.push(("elapsed_us", elapsed.as_str()));
        Logger::info(self.complete.as_str(), &fields);
    }

}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if self.enabled && !self.completed {
            let event = format!("{}_INCOMPLETE", self.begin.as_str());
            Logger::warn(&event, &[("reason", "scope dropped without completion")]);
        }
    }
}

fn borrow_fields<'a>(fields: &'a [(&'static str, String)]) -> Vec<(&'a str, &'a str)> {
    fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

/// Elapsed-time helper
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed microseconds as a string
    pub fn elapsed_us(&self) -> String {
        self.start.elapsed().as_micros().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_complete() {
        let scope = ObservationScope::new(
            Event::TagPassBegin,
            Event::TagPassComplete,
            vec![("nodes", "3".to_string())],
            false,
        );
        scope.complete(&[("subsumed", "1")]);
    }

    #[test]
    fn test_scope_complete_merges_fields() {
        let scope = ObservationScope::new(
            Event::TagPassBegin,
            Event::TagPassComplete,
            vec![("nodes", "7".to_string())],
            true,
        );
        let extra = 2.to_string();
        scope.complete(&[("relocations", extra.as_str()), ("unresolved", "0")]);
    }

    #[test]
    fn test_borrow_fields() {
        let owned = vec![("nodes", "7".to_string()), ("depth", "2".to_string())];
        assert_eq!(borrow_fields(&owned), vec![("nodes", "7"), ("depth", "2")]);
    }

    #[test]
    fn test_scope_drop_without_complete() {
        let scope =
            ObservationScope::new(Event::TagPassBegin, Event::TagPassComplete, vec![], true);
        drop(scope);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let us: u128 = timer.elapsed_us().parse().unwrap();
        assert!(us >= 2000);
    }
}
