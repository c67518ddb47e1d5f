use crate::error::{AutopilotError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ExecutionState
// ---------------------------------------------------------------------------

/// Cursor into the action list plus the three mode flags.
///
/// `cursor` is always the *next* action to run, so a crash while running
/// step N resumes at step N.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionState {
    pub interactive: bool,
    #[serde(rename = "verify_status")]
    pub verify_exit_status: bool,
    #[serde(rename = "simulate_type")]
    pub simulate_typing: bool,
    #[serde(rename = "next_step")]
    pub cursor: usize,
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self {
            interactive: true,
            verify_exit_status: false,
            simulate_typing: true,
            cursor: 0,
        }
    }
}

impl ExecutionState {
    pub fn is_complete(&self, action_count: usize) -> bool {
        self.cursor >= action_count
    }
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Durable home of the execution state. Nothing else touches the backing file.
pub trait StateStore {
    fn load(&self) -> Result<ExecutionState>;
    fn save(&self, state: &ExecutionState) -> Result<()>;
}

/// YAML file store, written with an atomic rename.
#[derive(Debug, Clone)]
pub struct YamlStateStore {
    path: PathBuf,
}

impl YamlStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl StateStore for YamlStateStore {
    fn load(&self) -> Result<ExecutionState> {
        let data = std::fs::read_to_string(&self.path)?;
        let state: ExecutionState = serde_yaml::from_str(&data)?;
        Ok(state)
    }

    fn save(&self, state: &ExecutionState) -> Result<()> {
        let data = serde_yaml::to_string(state)?;
        crate::io::atomic_write(&self.path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

/// Load the persisted state for a deck of `action_count` actions.
///
/// Any failure is logged and answered with the defaults. A successful load is
/// forced back into interactive mode so a resumed run always pauses first.
pub fn load_or_default(store: &dyn StateStore, action_count: usize) -> ExecutionState {
    let loaded = store.load().and_then(|state| {
        if state.cursor > action_count {
            return Err(AutopilotError::InvalidState(format!(
                "next_step {} is past the last of {} actions",
                state.cursor, action_count
            )));
        }
        Ok(state)
    });

    match loaded {
        Ok(mut state) => {
            tracing::info!(step = state.cursor, "loaded state from file");
            state.interactive = true;
            state
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not load state from file, using default values");
            ExecutionState::default()
        }
    }
}
