//! CLI command handling
//!
//! Runs scenarios and formats their outcomes.

use colored::Colorize;

use crate::commands::{Commands, GlobalArgs};
use crate::common::config::Config;
use crate::common::{paths, Error, Result};
use crate::harness::{run_scenario, smoke, Harness, TargetLaunch};
use crate::testing::{run_scenario_file, ScenarioOutcome};

/// Dispatch a CLI command
pub fn dispatch(command: Commands, global: &GlobalArgs) -> Result<()> {
    let mut config = Config::load(global.config.as_deref())?;
    global.apply(&mut config);

    match command {
        Commands::Run { scenarios } => {
            let mut outcomes = Vec::with_capacity(scenarios.len());
            for path in &scenarios {
                outcomes.push(run_scenario_file(path, &config, !global.json)?);
            }
            print_outcomes(&outcomes, global.json)
        }

        Commands::Smoke => {
            let mut harness = Harness::from_config(&config)?;
            if !global.json {
                println!("Starting {} ...", harness.launch().command_line());
            }
            let screenshots = run_scenario(&mut harness, smoke)?;
            let outcome = ScenarioOutcome {
                name: "smoke".to_string(),
                commands_sent: harness.commands_sent(),
                screenshots,
            };
            print_outcomes(&[outcome], global.json)
        }

        Commands::Config => {
            print_config(&config, global);
            Ok(())
        }
    }
}

fn print_outcomes(outcomes: &[ScenarioOutcome], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
        return Ok(());
    }

    for outcome in outcomes {
        println!(
            "{} {}: {} command(s) sent",
            "✓".green(),
            outcome.name.bold(),
            outcome.commands_sent
        );
        for shot in &outcome.screenshots {
            println!("    {}", shot.display().to_string().dimmed());
        }
    }
    Ok(())
}

fn print_config(config: &Config, global: &GlobalArgs) {
    let source = match (&global.config, paths::config_path()) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(path)) if path.exists() => path.display().to_string(),
        (None, Some(path)) => format!("{} (not present, using defaults)", path.display()),
        (None, None) => "built-in defaults".to_string(),
    };

    let launch = TargetLaunch::from_config(config);

    println!("Config:      {}", source);
    println!("Command:     {}", launch.command_line());
    println!("Screenshots: {}", config.screenshots.dir.display());
    println!(
        "CI detected: {} ({})",
        config.environment.ci_detected(),
        config.environment.ci_indicator
    );
    if launch.env.is_empty() {
        println!("Environment: (no overrides)");
    } else {
        println!("Environment:");
        for (key, value) in &launch.env {
            println!("  {}={}", key, value);
        }
    }

    match launch.resolve_program() {
        Ok(path) => println!("Executable:  {}", path.display()),
        Err(Error::LaunchFailed { reason, .. }) => {
            println!("Executable:  {} ({})", "not found".red(), reason)
        }
        Err(e) => println!("Executable:  {} ({})", "not found".red(), e),
    }
}
