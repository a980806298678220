//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Target application settings
    #[serde(default)]
    pub target: TargetConfig,

    /// Screenshot output settings
    #[serde(default)]
    pub screenshots: ScreenshotConfig,

    /// Environment overrides applied at launch
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

/// How to invoke the target application
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Path to the target executable (bare names are searched in PATH)
    #[serde(default = "default_target_path")]
    pub path: PathBuf,

    /// Additional arguments passed after the harness flag
    #[serde(default)]
    pub args: Vec<String>,

    /// Flag that switches the target into harness mode (empty to omit)
    #[serde(default = "default_harness_flag")]
    pub harness_flag: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            path: default_target_path(),
            args: Vec::new(),
            harness_flag: default_harness_flag(),
        }
    }
}

fn default_target_path() -> PathBuf {
    PathBuf::from("./fheroes2")
}

fn default_harness_flag() -> String {
    "--test-harness".to_string()
}

impl TargetConfig {
    /// Full argument list: the harness flag followed by the extra arguments
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        if !self.harness_flag.is_empty() {
            args.push(self.harness_flag.clone());
        }
        args.extend(self.args.iter().cloned());
        args
    }
}

/// Screenshot output settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScreenshotConfig {
    /// Directory the target writes screenshots into
    #[serde(default = "default_screenshot_dir")]
    pub dir: PathBuf,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            dir: default_screenshot_dir(),
        }
    }
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

/// Environment overrides merged into the inherited environment
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvironmentConfig {
    /// Variable whose non-empty presence marks a CI run
    #[serde(default = "default_ci_indicator")]
    pub ci_indicator: String,

    /// Variables that switch the target to headless rendering
    #[serde(default = "default_headless")]
    pub headless: BTreeMap<String, String>,

    /// Apply the headless variables even outside CI
    #[serde(default)]
    pub force_headless: bool,

    /// Variables applied on every launch
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            ci_indicator: default_ci_indicator(),
            headless: default_headless(),
            force_headless: false,
            extra: BTreeMap::new(),
        }
    }
}

fn default_ci_indicator() -> String {
    "CI".to_string()
}

fn default_headless() -> BTreeMap<String, String> {
    BTreeMap::from([("SDL_VIDEODRIVER".to_string(), "dummy".to_string())])
}

impl EnvironmentConfig {
    /// Whether the CI indicator is set in the current environment
    pub fn ci_detected(&self) -> bool {
        std::env::var_os(&self.ci_indicator).is_some_and(|v| !v.is_empty())
    }

    /// Overrides for the current environment
    pub fn overrides(&self) -> BTreeMap<String, String> {
        self.overrides_for(self.ci_detected())
    }

    /// Overrides given whether a CI run was detected
    ///
    /// Headless variables win over `extra` when both name the same variable.
    pub fn overrides_for(&self, ci: bool) -> BTreeMap<String, String> {
        let mut env = self.extra.clone();
        if ci || self.force_headless {
            env.extend(self.headless.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        env
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Otherwise the default config file is used
    /// if present, and built-in defaults if not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = config_path() {
            if path.exists() {
                tracing::debug!("Loading configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}
