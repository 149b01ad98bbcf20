//! Build phase tracking.
//!
//! Progress of one configuration is recorded in `.slipway/state.json`
//! inside its build directory, together with the snapshot fingerprint it
//! belongs to. The file is written only after a step completes, so an
//! interrupted or failed step leaves the previous phase on disk and a
//! retry resumes from there. `Failed` is an in-memory transition only
//! and is never persisted.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::util::fs::write_string;

/// File name of the state record inside the layout's state dir.
pub const STATE_FILE_NAME: &str = "state.json";

/// Progress of one configuration through the build pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    NotConfigured,
    Configured,
    Built,
    Packaged,
    Failed,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildPhase::NotConfigured => "not configured",
            BuildPhase::Configured => "configured",
            BuildPhase::Built => "built",
            BuildPhase::Packaged => "packaged",
            BuildPhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// On-disk representation of the state record.
#[derive(Debug, Serialize, Deserialize)]
struct RawState {
    phase: BuildPhase,
    fingerprint: String,
}

/// The persisted phase of one (configuration, build dir) pair.
#[derive(Debug)]
pub struct BuildState {
    phase: BuildPhase,
    fingerprint: String,
    path: PathBuf,
}

impl BuildState {
    /// Load the state for a layout, or start fresh.
    ///
    /// A missing or unreadable file, and a record written for a different
    /// fingerprint, both mean `NotConfigured`.
    pub fn load(layout: &Layout, fingerprint: &str) -> Self {
        let path = layout.state_dir().join(STATE_FILE_NAME);

        let recorded = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<RawState>(&raw).ok());

        let phase = match recorded {
            Some(raw) if raw.fingerprint == fingerprint => raw.phase,
            Some(_) => {
                tracing::debug!(
                    "state at {} belongs to another configuration, starting fresh",
                    path.display()
                );
                BuildPhase::NotConfigured
            }
            None => BuildPhase::NotConfigured,
        };

        BuildState {
            phase,
            fingerprint: fingerprint.to_string(),
            path,
        }
    }

    /// Get the recorded phase.
    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Record a completed phase, persisting it immediately.
    pub fn record(&mut self, phase: BuildPhase) -> Result<()> {
        self.phase = phase;
        let raw = RawState {
            phase,
            fingerprint: self.fingerprint.clone(),
        };
        let contents =
            serde_json::to_string_pretty(&raw).context("failed to serialize build state")?;
        write_string(&self.path, &contents)?;
        tracing::debug!("recorded phase `{}` at {}", phase, self.path.display());
        Ok(())
    }

    /// Mark the in-memory phase `Failed` without touching the record on
    /// disk, so a retry resumes from the last completed step.
    pub fn mark_failed(&mut self) {
        self.phase = BuildPhase::Failed;
    }
}
