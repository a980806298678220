//! Scenario runner implementation
//!
//! Plays a scenario file against a freshly started target. The first failing
//! step aborts the scenario; the target is stopped either way and the error
//! is returned unchanged.

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

use crate::common::config::Config;
use crate::common::paths::resolve_relative;
use crate::common::Result;
use crate::harness::{run_scenario, Harness};

use super::config::{ScenarioFile, ScenarioStep, TargetOverrides};

/// What a completed scenario did
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    /// Commands delivered to the target, not counting the final `exit`
    pub commands_sent: usize,
    /// Screenshot paths the target was asked to write
    pub screenshots: Vec<PathBuf>,
}

/// Run a scenario from a YAML file
///
/// Target settings come from `config`, overridden by the scenario's own
/// `target` section. Progress goes to stdout when `progress` is set.
pub fn run_scenario_file(path: &Path, config: &Config, progress: bool) -> Result<ScenarioOutcome> {
    let scenario = ScenarioFile::load(path)?;
    let scenario_dir = path.parent().unwrap_or(Path::new("."));

    let config = apply_overrides(config, &scenario.target, scenario_dir);
    let mut harness = Harness::from_config(&config)?;

    if progress {
        println!(
            "\n{} {}",
            "Running Scenario:".blue().bold(),
            scenario.name.white().bold()
        );
        if let Some(desc) = &scenario.description {
            println!("  {}", desc.dimmed());
        }
        println!("  $ {}", harness.launch().command_line().dimmed());
        println!("\n{}", "Steps:".cyan());
    }

    tracing::info!("Running scenario '{}' from {}", scenario.name, path.display());

    let screenshots = run_scenario(&mut harness, |h| {
        let mut screenshots = Vec::new();
        for (i, step) in scenario.steps.iter().enumerate() {
            let step_num = i + 1;
            match execute_step(h, step, scenario_dir) {
                Ok(shot) => {
                    if progress {
                        println!("  {} Step {}: {}", "✓".green(), step_num, step.to_string().dimmed());
                    }
                    screenshots.extend(shot);
                }
                Err(e) => {
                    if progress {
                        println!("  {} Step {}: {}: {}", "✗".red(), step_num, step, e);
                    }
                    return Err(e);
                }
            }
        }
        Ok(screenshots)
    })?;

    if progress {
        println!("\n{} {}\n", "✓".green().bold(), "Scenario complete".green().bold());
    }

    Ok(ScenarioOutcome {
        name: scenario.name,
        commands_sent: harness.commands_sent(),
        screenshots,
    })
}

/// Execute a single step, returning the screenshot path if it requested one
fn execute_step(harness: &mut Harness, step: &ScenarioStep, scenario_dir: &Path) -> Result<Option<PathBuf>> {
    match step {
        ScenarioStep::Wait { ms } => harness.wait(*ms).map(|()| None),
        ScenarioStep::Click { x, y } => harness.click(*x, *y).map(|()| None),
        ScenarioStep::Screenshot { name } => harness.screenshot(name).map(Some),
        ScenarioStep::LoadSavegame { path } => harness
            .load_savegame(resolve_relative(scenario_dir, path))
            .map(|()| None),
    }
}

/// Layer a scenario's target section over the base configuration
fn apply_overrides(base: &Config, overrides: &TargetOverrides, scenario_dir: &Path) -> Config {
    let mut config = base.clone();
    if let Some(path) = &overrides.path {
        config.target.path = resolve_relative(scenario_dir, path);
    }
    if let Some(args) = &overrides.args {
        config.target.args = args.clone();
    }
    if let Some(dir) = &overrides.screenshot_dir {
        config.screenshots.dir = resolve_relative(scenario_dir, dir);
    }
    config
        .environment
        .extra
        .extend(overrides.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    config
}
