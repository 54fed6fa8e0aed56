use serde::{Deserialize, Serialize};

use crate::error::{EmitterError, Result};

/// Event name that addresses every event in [`EventEmitter::off_event`] and
/// [`EventEmitter::has`].
///
/// [`EventEmitter::off_event`]: crate::EventEmitter::off_event
/// [`EventEmitter::has`]: crate::EventEmitter::has
pub const WILDCARD: &str = "*";

// ============================================================================
// Options
// ============================================================================

/// Construction options for an [`EventEmitter`](crate::EventEmitter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterOptions {
    /// Name attached to this emitter's log records.
    pub label: Option<String>,
    /// Log a warning once a single event holds more than this many listeners.
    /// Registration is never refused.
    pub max_listeners: Option<usize>,
}

impl EmitterOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_listeners == Some(0) {
            return Err(EmitterError::ZeroMaxListeners);
        }
        Ok(())
    }

    pub(crate) fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}
