//! Durable trigger state storage
//!
//! The state is one JSON document. Saves go through a temp file and an
//! atomic rename so a crashed write never leaves a half-written document
//! for the next load to trip over.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::common::errors::Result;
use crate::trigger::types::TriggerState;

/// Load/save the trigger state as a single atomic unit
pub trait StateStore: Send + Sync {
    /// Returns the persisted state, or a zero-valued default if none exists
    fn load(&self) -> Result<TriggerState>;

    /// Persist the full state; all-or-nothing from the caller's perspective
    fn save(&self, state: &TriggerState) -> Result<()>;
}

/// File-backed JSON implementation of [`StateStore`]
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<TriggerState> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no state file yet, starting fresh");
            return Ok(TriggerState::default());
        }

        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(state) => Ok(state),
            Err(err) => {
                // An unreadable file means progress is lost; a fresh start is
                // the documented behavior, not an abort.
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "state file unreadable, starting fresh"
                );
                Ok(TriggerState::default())
            }
        }
    }

    fn save(&self, state: &TriggerState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(
            path = %self.path.display(),
            trigger_count = state.trigger_count,
            "state persisted"
        );
        Ok(())
    }
}
