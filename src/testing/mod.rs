//! YAML scenario runner
//!
//! Loads scenario files and plays their steps against a [`Harness`](crate::harness::Harness)
//! inside a scoped session, so the target is stopped whatever happens.

mod config;
mod runner;

pub use config::*;
pub use runner::{run_scenario_file, ScenarioOutcome};
