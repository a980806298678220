//! Scenario file types
//!
//! Defines the data structures for deserializing YAML scenarios:
//!
//! ```yaml
//! name: main menu
//! target:
//!   path: ./fheroes2
//! steps:
//!   - action: wait
//!     ms: 2000
//!   - action: screenshot
//!     name: main_menu_initial
//!   - action: click
//!     x: 400
//!     y: 300
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// A complete scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    /// Name of the scenario
    pub name: String,
    /// Optional description of what the scenario exercises
    pub description: Option<String>,
    /// Overrides for the configured target
    #[serde(default)]
    pub target: TargetOverrides,
    /// The sequence of steps to execute
    pub steps: Vec<ScenarioStep>,
}

/// Per-scenario target settings; relative paths resolve against the scenario file
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetOverrides {
    /// Path to the target executable
    pub path: Option<PathBuf>,
    /// Replaces the configured extra arguments
    pub args: Option<Vec<String>>,
    /// Added to the configured environment overrides
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Screenshot directory for this scenario
    pub screenshot_dir: Option<PathBuf>,
}

/// A single step in the scenario
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Let the target pause its loop
    Wait { ms: u32 },
    /// Left click at window coordinates
    Click { x: i32, y: i32 },
    /// Capture `<screenshot_dir>/<name>.png`
    Screenshot { name: String },
    /// Load a saved game
    LoadSavegame { path: PathBuf },
}

impl fmt::Display for ScenarioStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wait { ms } => write!(f, "wait {ms}ms"),
            Self::Click { x, y } => write!(f, "click ({x}, {y})"),
            Self::Screenshot { name } => write!(f, "screenshot {name}"),
            Self::LoadSavegame { path } => write!(f, "load savegame {}", path.display()),
        }
    }
}

impl ScenarioFile {
    /// Read and parse a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("Failed to parse scenario '{}': {}", path.display(), e)))
    }

    /// Parse scenario YAML
    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}
