//! UI harness - drive an interactive application from the outside
//!
//! Launches a target process in harness mode and steers it with a one-way,
//! line-oriented command protocol on its standard input: clicks, waits,
//! screenshots and savegame loads. The target does all rendering and writes
//! screenshots itself; the harness never reads anything back.

pub mod cli;
pub mod commands;
pub mod common;
pub mod harness;
pub mod protocol;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use harness::{run_scenario, Harness, HarnessSession, HarnessState, TargetLaunch};
pub use protocol::Command;
