//! End-to-end integration tests for the UI harness
//!
//! These tests drive the `mock_target` binary, which speaks the command
//! protocol and records every line it receives, so the exact command stream
//! can be checked after the target has exited.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;
use ui_harness::{run_scenario, Error, Harness, HarnessState, TargetLaunch};

const MOCK_TARGET: &str = env!("CARGO_BIN_EXE_mock_target");
const HARNESS_BIN: &str = env!("CARGO_BIN_EXE_ui-harness");

/// Test context with a scratch directory and the mock target's command log
struct TestContext {
    temp_dir: TempDir,
    log: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let log = temp_dir.path().join("commands.log");
        Self { temp_dir, log }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn screenshot_dir(&self) -> PathBuf {
        self.path().join("screenshots")
    }

    /// Empty config file so the CLI ignores any per-user configuration
    fn empty_config(&self) -> PathBuf {
        let path = self.path().join("config.toml");
        fs::write(&path, "").expect("Failed to write config");
        path
    }

    /// Launch description for the mock target in harness mode
    fn launch(&self) -> TargetLaunch {
        TargetLaunch::new(MOCK_TARGET)
            .arg("--test-harness")
            .env("MOCK_TARGET_LOG", self.log.display().to_string())
            .env("MOCK_TARGET_NO_SLEEP", "1")
    }

    fn harness(&self) -> Harness {
        self.harness_with(self.launch())
    }

    fn harness_with(&self, launch: TargetLaunch) -> Harness {
        Harness::new(launch, self.screenshot_dir()).expect("Failed to create harness")
    }

    /// Lines the mock target received, in order
    fn received(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    // Signal 0 tests process existence without side effects
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

// ============== Tests ==============

#[test]
fn test_smoke_scenario_end_to_end() {
    let ctx = TestContext::new();
    let mut harness = ctx.harness();

    let shots = run_scenario(&mut harness, ui_harness::harness::smoke).unwrap();

    let dir = harness.screenshot_dir().to_path_buf();
    let initial = dir.join("initial_state.png");
    let after = dir.join("after_click.png");
    assert_eq!(shots, vec![initial.clone(), after.clone()]);

    assert_eq!(
        ctx.received(),
        vec![
            "wait 5000".to_string(),
            format!("screenshot {}", initial.display()),
            "wait 1000".to_string(),
            "click 320 240".to_string(),
            "wait 1000".to_string(),
            format!("screenshot {}", after.display()),
            "exit".to_string(),
        ]
    );

    // The mock target writes placeholder images where it was told to
    assert!(initial.is_file());
    assert!(after.is_file());
    assert_eq!(harness.state(), HarnessState::Stopped);
    assert_eq!(harness.commands_sent(), 6);
}

#[cfg(unix)]
#[test]
fn test_target_not_running_after_stop() {
    let ctx = TestContext::new();
    let mut harness = ctx.harness();

    harness.start().unwrap();
    let pid = harness.pid().expect("running target has a pid");
    assert!(process_alive(pid));

    let status = harness.stop().unwrap().expect("target was running");
    assert!(status.success());
    assert!(!process_alive(pid));
}

#[test]
fn test_commands_before_start_fail() {
    let ctx = TestContext::new();
    let mut harness = ctx.harness();

    assert!(matches!(harness.click(320, 240), Err(Error::InvalidState { .. })));
    assert!(matches!(harness.wait(1000), Err(Error::InvalidState { .. })));
    assert!(matches!(harness.screenshot("foo"), Err(Error::InvalidState { .. })));
    assert!(matches!(harness.load_savegame("x.sav"), Err(Error::InvalidState { .. })));
    assert!(ctx.received().is_empty());
}

#[test]
fn test_stop_twice_is_noop() {
    let ctx = TestContext::new();
    let mut harness = ctx.harness();

    harness.start().unwrap();
    assert!(harness.stop().unwrap().is_some());
    assert!(harness.stop().unwrap().is_none());
    assert_eq!(ctx.received(), vec!["exit"]);
}

#[test]
fn test_screenshot_path_under_directory() {
    let ctx = TestContext::new();
    let mut harness = ctx.harness();

    harness.start().unwrap();
    let path = harness.screenshot("foo").unwrap();
    harness.stop().unwrap();

    assert!(path.ends_with("foo.png"));
    assert!(path.starts_with(harness.screenshot_dir()));

    let screenshots: Vec<_> = ctx
        .received()
        .into_iter()
        .filter(|line| line.starts_with("screenshot "))
        .collect();
    assert_eq!(screenshots, vec![format!("screenshot {}", path.display())]);
}

#[test]
fn test_wait_returns_before_target_pauses() {
    let ctx = TestContext::new();
    // This target really sleeps on `wait`
    let launch = TargetLaunch::new(MOCK_TARGET)
        .arg("--test-harness")
        .env("MOCK_TARGET_LOG", ctx.log.display().to_string());
    let mut harness = ctx.harness_with(launch);

    harness.start().unwrap();
    let started = Instant::now();
    harness.wait(3000).unwrap();
    harness.click(1, 1).unwrap();
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(1000),
        "wait blocked the harness for {elapsed:?}"
    );

    // The target works through the pause before it reads `exit`
    let status = harness.stop().unwrap().expect("target was running");
    assert!(status.success());
    assert!(started.elapsed() >= Duration::from_millis(3000));
    assert_eq!(ctx.received(), vec!["wait 3000", "click 1 1", "exit"]);
}

#[test]
fn test_failing_step_stops_target_once() {
    let ctx = TestContext::new();
    let mut harness = ctx.harness();

    let err = run_scenario(&mut harness, |h| {
        h.wait(100)?;
        h.load_savegame("saves/my castle.sav")?;
        h.click(1, 1)
    })
    .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(ctx.received(), vec!["wait 100", "exit"]);
    assert_eq!(harness.state(), HarnessState::Stopped);
}

#[test]
fn test_crashed_target_is_channel_error() {
    let ctx = TestContext::new();
    let mut harness = ctx.harness_with(ctx.launch().env("MOCK_TARGET_EXIT_AFTER", "1"));

    harness.start().unwrap();
    harness.click(10, 10).unwrap();

    // The write only fails once the target has actually gone away
    let mut failure = None;
    for _ in 0..200 {
        match harness.wait(0) {
            Ok(()) => thread::sleep(Duration::from_millis(10)),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    let err = failure.expect("writes to an exited target should fail");
    assert!(err.is_broken_pipe(), "unexpected error: {err}");

    // Stop still succeeds and hands back the uninterpreted exit status
    let status = harness.stop().unwrap().expect("process handle was held");
    assert_eq!(status.code(), Some(3));
    assert_eq!(harness.state(), HarnessState::Stopped);
}

#[test]
fn test_exit_code_is_not_interpreted() {
    let ctx = TestContext::new();
    // Without the harness flag the mock target refuses to run
    let launch = TargetLaunch::new(MOCK_TARGET).env("MOCK_TARGET_LOG", ctx.log.display().to_string());
    let mut harness = ctx.harness_with(launch);

    harness.start().unwrap();
    let status = harness.stop().unwrap().expect("target was started");
    assert_eq!(status.code(), Some(2));
}

#[test]
fn test_missing_target_is_launch_error() {
    let ctx = TestContext::new();
    let mut harness = ctx.harness_with(TargetLaunch::new(ctx.path().join("no-such-game")));

    assert!(matches!(harness.start(), Err(Error::LaunchFailed { .. })));
    assert_eq!(harness.state(), HarnessState::Unstarted);
}

#[test]
fn test_yaml_scenario_file() {
    let ctx = TestContext::new();
    let scenario = ctx.path().join("menu.yml");
    fs::write(
        &scenario,
        format!(
            r#"
name: main menu
target:
  path: {target}
  screenshot_dir: shots
  env:
    MOCK_TARGET_LOG: {log}
    MOCK_TARGET_NO_SLEEP: "1"
steps:
  - action: wait
    ms: 2000
  - action: screenshot
    name: main_menu_initial
  - action: click
    x: 400
    y: 300
  - action: load_savegame
    path: saves/castle.sav
"#,
            target = MOCK_TARGET,
            log = ctx.log.display(),
        ),
    )
    .unwrap();

    let config = ui_harness::common::config::Config::default();
    let outcome = ui_harness::testing::run_scenario_file(&scenario, &config, false).unwrap();

    let shots = ctx.path().canonicalize().unwrap().join("shots");
    assert_eq!(outcome.name, "main menu");
    assert_eq!(outcome.commands_sent, 4);
    assert_eq!(outcome.screenshots, vec![shots.join("main_menu_initial.png")]);

    assert_eq!(
        ctx.received(),
        vec![
            "wait 2000".to_string(),
            format!("screenshot {}", shots.join("main_menu_initial.png").display()),
            "click 400 300".to_string(),
            format!("load_savegame {}", ctx.path().join("saves/castle.sav").display()),
            "exit".to_string(),
        ]
    );
}

#[test]
fn test_cli_smoke_json() {
    let ctx = TestContext::new();

    let output = Command::new(HARNESS_BIN)
        .arg("--config")
        .arg(ctx.empty_config())
        .args(["--target", MOCK_TARGET, "--screenshots"])
        .arg(ctx.screenshot_dir())
        .args(["--json", "smoke"])
        .env("MOCK_TARGET_LOG", &ctx.log)
        .env("MOCK_TARGET_NO_SLEEP", "1")
        .output()
        .expect("Failed to run ui-harness");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let outcomes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcomes[0]["name"], "smoke");
    assert_eq!(outcomes[0]["commands_sent"], 6);
    assert_eq!(ctx.received().last().map(String::as_str), Some("exit"));
}

#[test]
fn test_cli_reports_launch_error() {
    let ctx = TestContext::new();

    let output = Command::new(HARNESS_BIN)
        .arg("--config")
        .arg(ctx.empty_config())
        .arg("--target")
        .arg(ctx.path().join("missing-game"))
        .arg("--screenshots")
        .arg(ctx.screenshot_dir())
        .arg("smoke")
        .output()
        .expect("Failed to run ui-harness");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to launch target"), "stderr: {stderr}");
}
