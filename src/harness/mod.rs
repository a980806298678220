//! Harness facade
//!
//! Owns at most one target process and is the only writer to its input.
//! Every call blocks until its local step completes (spawn, write and flush,
//! process exit). Timing happens inside the target: `wait` returns as soon as
//! the command is written.

mod channel;
mod process;
mod scenario;
mod screenshot;

pub use channel::CommandChannel;
pub use process::{TargetLaunch, TargetProcess};
pub use scenario::{run_scenario, smoke, HarnessSession};
pub use screenshot::ScreenshotDir;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::protocol::Command;

/// Lifecycle state of a [`Harness`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    /// Constructed, target not launched yet
    Unstarted,
    /// Target running and accepting commands
    Running,
    /// Target shut down; terminal
    Stopped,
}

impl fmt::Display for HarnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unstarted => "unstarted",
            Self::Running => "running",
            Self::Stopped => "stopped",
        })
    }
}

/// Drives one target process through the command protocol
pub struct Harness {
    launch: TargetLaunch,
    screenshots: ScreenshotDir,
    process: Option<TargetProcess>,
    state: HarnessState,
    sent: usize,
}

impl Harness {
    /// Create a harness; the screenshot directory is created here, once
    pub fn new(launch: TargetLaunch, screenshot_dir: impl AsRef<Path>) -> Result<Self> {
        let screenshots = ScreenshotDir::create(screenshot_dir)?;
        tracing::debug!("Screenshots go to {}", screenshots.path().display());

        Ok(Self {
            launch,
            screenshots,
            process: None,
            state: HarnessState::Unstarted,
            sent: 0,
        })
    }

    /// Create a harness from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(TargetLaunch::from_config(config), &config.screenshots.dir)
    }

    pub fn state(&self) -> HarnessState {
        self.state
    }

    /// PID of the running target
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(TargetProcess::id)
    }

    pub fn launch(&self) -> &TargetLaunch {
        &self.launch
    }

    /// Absolute screenshot directory
    pub fn screenshot_dir(&self) -> &Path {
        self.screenshots.path()
    }

    /// Launch the target
    ///
    /// Only valid once: starting a running or stopped harness is a state error.
    /// On launch failure the harness stays unstarted.
    pub fn start(&mut self) -> Result<()> {
        if self.state != HarnessState::Unstarted {
            return Err(Error::invalid_state("start", &self.state.to_string()));
        }

        let process = TargetProcess::spawn(&self.launch)?;
        tracing::info!(
            pid = process.id(),
            "Started target {}",
            process.program().display()
        );

        self.process = Some(process);
        self.state = HarnessState::Running;
        Ok(())
    }

    /// Send a raw protocol command
    pub fn send(&mut self, command: &Command) -> Result<()> {
        self.running(command.verb())?.send(command)?;
        self.sent += 1;
        Ok(())
    }

    /// Commands delivered so far, not counting the final `exit`
    pub fn commands_sent(&self) -> usize {
        self.sent
    }

    /// Simulate a left click at window coordinates
    pub fn click(&mut self, x: i32, y: i32) -> Result<()> {
        self.send(&Command::Click { x, y })
    }

    /// Ask the target to pause its command loop
    ///
    /// Returns once the command is written; the harness does not sleep.
    pub fn wait(&mut self, milliseconds: u32) -> Result<()> {
        self.send(&Command::Wait { milliseconds })
    }

    /// Request a screenshot named `<name>.png` in the screenshot directory
    ///
    /// Returns the path the target was told to write. The file is not checked.
    pub fn screenshot(&mut self, name: &str) -> Result<PathBuf> {
        self.running(Command::SCREENSHOT)?;
        let path = self.screenshots.resolve(name)?;
        self.send(&Command::screenshot(&path))?;
        Ok(path)
    }

    /// Ask the target to load a saved game
    pub fn load_savegame(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.send(&Command::load_savegame(path.as_ref()))
    }

    /// Shut the target down
    ///
    /// A no-op without a running target, so repeated calls are safe. Otherwise
    /// sends `exit` and blocks until the process terminates; the exit status is
    /// returned as-is and not interpreted.
    pub fn stop(&mut self) -> Result<Option<ExitStatus>> {
        let Some(process) = self.process.take() else {
            return Ok(None);
        };
        self.state = HarnessState::Stopped;

        let pid = process.id();
        let sent = process.commands_sent();
        tracing::info!(pid, "Stopping target after {} command(s)", sent);

        let status = process.shutdown()?;
        tracing::info!(pid, "Target exited with {}", status);
        Ok(Some(status))
    }

    fn running(&mut self, action: &str) -> Result<&mut TargetProcess> {
        let state = self.state;
        self.process
            .as_mut()
            .ok_or_else(|| Error::invalid_state(action, &state.to_string()))
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if self.process.is_some() {
            tracing::warn!("Harness dropped while target is running, stopping it");
            if let Err(e) = self.stop() {
                tracing::warn!("Failed to stop target: {}", e);
            }
        }
    }
}
