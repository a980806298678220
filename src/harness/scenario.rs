//! Scoped scenario execution
//!
//! Once a target has been started for a scenario it is asked to stop exactly
//! once, however the scenario ends: normal return, error or panic.

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::common::Result;

use super::Harness;

/// A started harness that stops its target when dropped
///
/// Obtained from [`Harness::session`]. Derefs to the [`Harness`] so scenario
/// steps are plain harness calls.
pub struct HarnessSession<'h> {
    harness: &'h mut Harness,
    finished: bool,
}

impl Harness {
    /// Start the target and return a guard that stops it on scope exit
    pub fn session(&mut self) -> Result<HarnessSession<'_>> {
        self.start()?;
        Ok(HarnessSession {
            harness: self,
            finished: false,
        })
    }
}

impl HarnessSession<'_> {
    /// Stop the target now and report the result
    pub fn finish(mut self) -> Result<Option<ExitStatus>> {
        self.finished = true;
        self.harness.stop()
    }
}

impl Deref for HarnessSession<'_> {
    type Target = Harness;

    fn deref(&self) -> &Harness {
        self.harness
    }
}

impl DerefMut for HarnessSession<'_> {
    fn deref_mut(&mut self) -> &mut Harness {
        self.harness
    }
}

impl Drop for HarnessSession<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.harness.stop() {
            tracing::warn!("Failed to stop target while leaving scenario: {}", e);
        }
    }
}

/// Run `scenario` between `start` and `stop`
///
/// `stop` runs exactly once after a successful start. A scenario error wins
/// over a stop error; the stop error is then only logged.
pub fn run_scenario<T, F>(harness: &mut Harness, scenario: F) -> Result<T>
where
    F: FnOnce(&mut Harness) -> Result<T>,
{
    let mut session = harness.session()?;
    let outcome = scenario(&mut *session);
    let stopped = session.finish();

    match (outcome, stopped) {
        (Ok(value), Ok(_)) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(_)) => Err(e),
        (Err(e), Err(stop_err)) => {
            tracing::warn!("Failed to stop target after scenario error: {}", stop_err);
            Err(e)
        }
    }
}

/// Built-in smoke scenario: let the target settle, click the centre of a
/// 640x480 window and capture before and after
pub fn smoke(harness: &mut Harness) -> Result<Vec<PathBuf>> {
    let mut shots = Vec::with_capacity(2);

    tracing::info!("Waiting for target to initialize");
    harness.wait(5000)?;
    shots.push(harness.screenshot("initial_state")?);
    harness.wait(1000)?;

    tracing::info!("Clicking center of screen");
    harness.click(320, 240)?;
    harness.wait(1000)?;
    shots.push(harness.screenshot("after_click")?);

    Ok(shots)
}
