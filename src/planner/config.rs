//! Tagging pass configuration
//!
//! Loaded from a JSON file. Every key is optional; unknown keys are
//! rejected so typos do not silently fall back to defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{LoadError, LoadResult};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Configuration of a `TagPass`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagPassConfig {
    /// Run tag propagation and canonical sorting after resolution (default: true)
    #[serde(default = "default_true")]
    pub canonicalize: bool,

    /// Emit begin/complete events for each pass (default: true)
    #[serde(default = "default_true")]
    pub log_events: bool,

    /// Emit one TRACE line per relocated directive set (default: false).
    /// Written only when `log_level` is "trace".
    #[serde(default)]
    pub trace_relocations: bool,

    /// Count directives left after resolution and warn if any (default: true)
    #[serde(default = "default_true")]
    pub verify_resolved: bool,

    /// Minimum log severity: "trace", "info", "warn" or "error" (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TagPassConfig {
    fn default() -> Self {
        Self {
            canonicalize: true,
            log_events: true,
            trace_relocations: false,
            verify_resolved: true,
            log_level: default_log_level(),
        }
    }
}

impl TagPassConfig {
    /// Configuration with all logging switched off
    pub fn quiet() -> Self {
        Self {
            log_events: false,
            trace_relocations: false,
            ..Default::default()
        }
    }

    /// Loads and validates configuration from a JSON file, then installs
    /// its `log_level` as the process-wide minimum severity
    pub fn load(path: &Path) -> LoadResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        config.apply_log_level()?;

        let shown = path.display().to_string();
        if config.log_events {
            log_event_with_fields(Event::ConfigLoaded, &[("path", shown.as_str())]);
        }
        Ok(config)
    }

    /// Parses and validates configuration from JSON text
    pub fn from_json_str(content: &str) -> LoadResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> LoadResult<()> {
        self.severity().map(|_| ())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> LoadResult<Severity> {
        match self.log_level.as_str() {
            "trace" => Ok(Severity::Trace),
            "info" => Ok(Severity::Info),
            "warn" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            other => Err(LoadError::InvalidConfig(format!(
                "log_level '{}' is not one of trace, info, warn, error",
                other
            ))),
        }
    }

    /// Installs `log_level` as the process-wide minimum severity
    pub fn apply_log_level(&self) -> LoadResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }
}
