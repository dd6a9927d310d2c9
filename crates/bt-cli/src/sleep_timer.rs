//! Sleep timer persisted between invocations.
//!
//! A running timer is a small JSON file holding the start instant. The file
//! is removed once the sleep has been logged, so a crash between the two
//! steps leaves the timer running rather than losing the start time.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contents of the timer file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct TimerFile {
    started_at: DateTime<Utc>,
}

/// Whether a sleep is currently being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    NoActiveSleep,
    SleepInProgress { started_at: DateTime<Utc> },
}

/// Handle to the timer file at a fixed path.
#[derive(Debug, Clone)]
pub struct SleepTimer {
    path: PathBuf,
}

impl SleepTimer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current state.
    ///
    /// A missing file means no sleep is in progress. A file that exists but
    /// cannot be read or parsed is an error.
    pub fn state(&self) -> Result<TimerState> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let file: TimerFile =
                    serde_json::from_str(&content).context("failed to parse sleep timer file")?;
                Ok(TimerState::SleepInProgress {
                    started_at: file.started_at,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TimerState::NoActiveSleep),
            Err(e) => Err(e).context("failed to read sleep timer file"),
        }
    }

    /// Starts timing a sleep.
    ///
    /// Fails if a timer is already running, leaving it untouched.
    pub fn start(&self, started_at: DateTime<Utc>) -> Result<()> {
        if let TimerState::SleepInProgress { started_at } = self.state()? {
            anyhow::bail!(
                "A sleep timer is already running (started {}). Run 'bt sleep stop' first.",
                started_at.to_rfc3339()
            );
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("failed to create data directory")?;
        }
        let json = serde_json::to_string_pretty(&TimerFile { started_at })
            .context("failed to serialize sleep timer")?;
        std::fs::write(&self.path, json).context("failed to write sleep timer file")?;
        tracing::debug!(path = %self.path.display(), %started_at, "sleep timer started");
        Ok(())
    }

    /// Returns the start instant of the running timer.
    pub fn require_running(&self) -> Result<DateTime<Utc>> {
        match self.state()? {
            TimerState::SleepInProgress { started_at } => Ok(started_at),
            TimerState::NoActiveSleep => {
                anyhow::bail!("No sleep timer is running. Run 'bt sleep start' first.")
            }
        }
    }

    /// Removes the timer file. Clearing an idle timer is a no-op.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "sleep timer cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("failed to remove sleep timer file"),
        }
    }
}
