//! CLI command definitions
//!
//! Defines the clap commands for the harness CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::common::config::Config;

/// Options shared by every subcommand
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Configuration file (default: platform config dir, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Target executable, overriding the configuration
    #[arg(long, global = true)]
    pub target: Option<PathBuf>,

    /// Screenshot directory, overriding the configuration
    #[arg(long, global = true)]
    pub screenshots: Option<PathBuf>,

    /// Force headless rendering even outside CI
    #[arg(long, global = true)]
    pub headless: bool,

    /// Show debug logs, including target output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Print results as JSON instead of progress output
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(target) = &self.target {
            config.target.path = target.clone();
        }
        if let Some(dir) = &self.screenshots {
            config.screenshots.dir = dir.clone();
        }
        if self.headless {
            config.environment.force_headless = true;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run YAML scenario files one after another
    Run {
        /// Scenario files to run
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,
    },

    /// Run the built-in smoke scenario (wait, screenshot, click, screenshot)
    Smoke,

    /// Show the resolved configuration and launch command
    Config,
}
