//! Observable events of the tagging passes

use std::fmt;

/// Events emitted while rewriting a predicate tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Tagging configuration loaded
    ConfigLoaded,
    /// A pass over one tree begins
    TagPassBegin,
    /// A pass over one tree completed
    TagPassComplete,
    /// One directive set was relocated into an indexed OR
    PredicateRelocated,
    /// A relocated predicate was removed from its original AND
    PredicateSubsumed,
    /// Directives were still attached after resolution
    DirectivesUnresolved,
    /// Canonical ordering applied
    TreeCanonicalized,
    /// Upstream contract broken (FATAL)
    ContractViolation,
}

impl Event {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::TagPassBegin => "TAG_PASS_BEGIN",
            Event::TagPassComplete => "TAG_PASS_COMPLETE",
            Event::PredicateRelocated => "PREDICATE_RELOCATED",
            Event::PredicateSubsumed => "PREDICATE_SUBSUMED",
            Event::DirectivesUnresolved => "DIRECTIVES_UNRESOLVED",
            Event::TreeCanonicalized => "TREE_CANONICALIZED",
            Event::ContractViolation => "CONTRACT_VIOLATION",
        }
    }

    /// True for events that halt the pass
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ContractViolation)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
