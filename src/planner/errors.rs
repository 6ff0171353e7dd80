//! Tagging pass error types
//!
//! Two families:
//! - Contract violations (AERO_TAG_*): the upstream enumerator handed over a
//!   malformed tree. Always FATAL; logged and then the pass panics.
//! - Load errors: reading configuration or decoding a tree from JSON.
//!   Recoverable, returned as `LoadResult`.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::observability::{Event, Logger, Severity};

/// Contract violation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractViolationCode {
    /// A directive was not routed to any child of the target OR
    AeroTagUnconsumedDirective,
    /// A stored directive had an empty path where a route was required
    AeroTagEmptyDirectivePath,
    /// `relocate` called on a node that is neither AND nor OR
    AeroTagInvalidTarget,
    /// AND target without an indexed OR child
    AeroTagMissingIndexedOr,
}

impl ContractViolationCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ContractViolationCode::AeroTagUnconsumedDirective => "AERO_TAG_UNCONSUMED_DIRECTIVE",
            ContractViolationCode::AeroTagEmptyDirectivePath => "AERO_TAG_EMPTY_DIRECTIVE_PATH",
            ContractViolationCode::AeroTagInvalidTarget => "AERO_TAG_INVALID_TARGET",
            ContractViolationCode::AeroTagMissingIndexedOr => "AERO_TAG_MISSING_INDEXED_OR",
        }
    }

    /// Contract violations are never recoverable
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }

    /// Short label of the broken contract
    pub fn invariant(&self) -> &'static str {
        match self {
            ContractViolationCode::AeroTagUnconsumedDirective => "every directive routed",
            ContractViolationCode::AeroTagEmptyDirectivePath => "stored path non-empty",
            ContractViolationCode::AeroTagInvalidTarget => "target is AND or OR",
            ContractViolationCode::AeroTagMissingIndexedOr => "AND target has indexed OR",
        }
    }
}

impl fmt::Display for ContractViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A broken upstream contract, with context
#[derive(Debug, Clone)]
pub struct ContractViolation {
    code: ContractViolationCode,
    message: String,
}

impl ContractViolation {
    pub fn new(code: ContractViolationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Directives left over after routing into an OR's branches
    pub fn unconsumed_directives(count: usize, branches: usize) -> Self {
        Self::new(
            ContractViolationCode::AeroTagUnconsumedDirective,
            format!(
                "{} directive(s) name no child of an OR with {} branch(es)",
                count, branches
            ),
        )
    }

    /// Directive with no hop left on reaching an OR
    pub fn empty_directive_path() -> Self {
        Self::new(
            ContractViolationCode::AeroTagEmptyDirectivePath,
            "directive reached an OR with no route left",
        )
    }

    /// Relocation into a node that is neither AND nor OR
    pub fn invalid_target(kind: &str) -> Self {
        Self::new(
            ContractViolationCode::AeroTagInvalidTarget,
            format!("cannot relocate into a {} node", kind),
        )
    }

    /// AND target with no indexed OR child
    pub fn missing_indexed_or() -> Self {
        Self::new(
            ContractViolationCode::AeroTagMissingIndexedOr,
            "AND relocation target has no indexed OR child",
        )
    }

    /// Code of the broken contract
    pub fn code(&self) -> ContractViolationCode {
        self.code
    }

    /// Context message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} [violates {}]",
            self.code.severity(),
            self.code.code(),
            self.message,
            self.code.invariant()
        )
    }
}

impl std::error::Error for ContractViolation {}

/// Logs the violation at FATAL and halts the pass.
#[track_caller]
pub fn contract_violation(violation: ContractViolation) -> ! {
    Logger::fatal(
        Event::ContractViolation.as_str(),
        &[
            ("code", violation.code().code()),
            ("message", violation.message()),
        ],
    );
    panic!("{}", violation);
}

/// Errors loading tagging inputs
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            ContractViolationCode::AeroTagUnconsumedDirective.code(),
            "AERO_TAG_UNCONSUMED_DIRECTIVE"
        );
        assert_eq!(
            ContractViolationCode::AeroTagInvalidTarget.code(),
            "AERO_TAG_INVALID_TARGET"
        );
        assert_eq!(
            ContractViolationCode::AeroTagMissingIndexedOr.code(),
            "AERO_TAG_MISSING_INDEXED_OR"
        );
    }

    #[test]
    fn test_all_violations_fatal() {
        for code in [
            ContractViolationCode::AeroTagUnconsumedDirective,
            ContractViolationCode::AeroTagEmptyDirectivePath,
            ContractViolationCode::AeroTagInvalidTarget,
            ContractViolationCode::AeroTagMissingIndexedOr,
        ] {
            assert_eq!(code.severity(), Severity::Fatal);
        }
    }

    #[test]
    fn test_violation_display() {
        let v = ContractViolation::invalid_target("$eq");
        let display = v.to_string();
        assert!(display.contains("FATAL"));
        assert!(display.contains("AERO_TAG_INVALID_TARGET"));
        assert!(display.contains("$eq"));
    }

    #[test]
    #[should_panic(expected = "AERO_TAG_MISSING_INDEXED_OR")]
    fn test_contract_violation_panics() {
        contract_violation(ContractViolation::missing_indexed_or());
    }

    #[test]
    fn test_load_error_from_json() {
        let err: LoadError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("invalid JSON"));
    }
}
