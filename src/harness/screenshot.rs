//! Screenshot path coordination
//!
//! The harness only decides where a screenshot goes. The target writes the
//! file, and nothing here checks that it did.

use std::fs;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// Managed output directory for screenshots
#[derive(Debug, Clone)]
pub struct ScreenshotDir {
    root: PathBuf,
}

impl ScreenshotDir {
    /// Image file extension appended to every screenshot name
    pub const EXTENSION: &'static str = "png";

    /// Create the directory if needed and pin it to an absolute path
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| {
            Error::Config(format!(
                "Failed to create screenshot directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
        let root = dir.canonicalize()?;
        Ok(Self { root })
    }

    /// Absolute directory path
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a logical name to `<dir>/<name>.png`
    ///
    /// Names are single file stems: separators, `..` and whitespace are
    /// rejected so the result always lies directly inside the directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name
                .chars()
                .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());

        if invalid {
            return Err(Error::InvalidArgument(format!(
                "Invalid screenshot name '{}'",
                name.escape_debug()
            )));
        }

        Ok(self.root.join(format!("{name}.{}", Self::EXTENSION)))
    }
}
