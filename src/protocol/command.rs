//! Typed protocol commands

use std::fmt;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// A single instruction for the target process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Left mouse click at window coordinates
    Click { x: i32, y: i32 },
    /// Pause the target's command loop
    Wait { milliseconds: u32 },
    /// Capture the display into an image file
    Screenshot { path: PathBuf },
    /// Load a saved game
    LoadSavegame { path: PathBuf },
    /// Ask the target to shut down
    Exit,
}

impl Command {
    pub const CLICK: &'static str = "click";
    pub const WAIT: &'static str = "wait";
    pub const SCREENSHOT: &'static str = "screenshot";
    pub const LOAD_SAVEGAME: &'static str = "load_savegame";
    pub const EXIT: &'static str = "exit";

    /// Create a screenshot command
    pub fn screenshot(path: impl Into<PathBuf>) -> Self {
        Self::Screenshot { path: path.into() }
    }

    /// Create a load-savegame command
    pub fn load_savegame(path: impl Into<PathBuf>) -> Self {
        Self::LoadSavegame { path: path.into() }
    }

    /// The verb that starts this command's line
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Click { .. } => Self::CLICK,
            Self::Wait { .. } => Self::WAIT,
            Self::Screenshot { .. } => Self::SCREENSHOT,
            Self::LoadSavegame { .. } => Self::LOAD_SAVEGAME,
            Self::Exit => Self::EXIT,
        }
    }

    /// Check that every argument survives whitespace splitting on the target side
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Screenshot { path } | Self::LoadSavegame { path } => {
                validate_path(self.verb(), path)
            }
            Self::Click { .. } | Self::Wait { .. } | Self::Exit => Ok(()),
        }
    }
}

fn validate_path(verb: &str, path: &Path) -> Result<()> {
    let text = path.to_str().ok_or_else(|| {
        Error::InvalidArgument(format!(
            "{verb} path '{}' is not valid UTF-8",
            path.display()
        ))
    })?;

    if text.is_empty() {
        return Err(Error::InvalidArgument(format!("{verb} path is empty")));
    }

    if text.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::InvalidArgument(format!(
            "{verb} path '{}' contains whitespace or control characters",
            text.escape_debug()
        )));
    }

    Ok(())
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click { x, y } => write!(f, "{} {} {}", self.verb(), x, y),
            Self::Wait { milliseconds } => write!(f, "{} {}", self.verb(), milliseconds),
            Self::Screenshot { path } | Self::LoadSavegame { path } => {
                write!(f, "{} {}", self.verb(), path.display())
            }
            Self::Exit => f.write_str(self.verb()),
        }
    }
}
