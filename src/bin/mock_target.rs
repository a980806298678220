//! Mock target binary for integration testing
//!
//! Speaks the harness command protocol on stdin without rendering anything.
//!
//! Environment knobs:
//! - `MOCK_TARGET_LOG`: append every decoded command to this file
//! - `MOCK_TARGET_EXIT_AFTER`: exit with code 3 after this many commands
//! - `MOCK_TARGET_NO_SLEEP`: acknowledge `wait` without sleeping

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

use ui_harness::protocol::{read_command, Command};
use ui_harness::Error;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn main() {
    if !std::env::args().skip(1).any(|arg| arg == "--test-harness") {
        eprintln!("mock_target: not started in harness mode (missing --test-harness)");
        std::process::exit(2);
    }

    let mut log: Option<File> = std::env::var_os("MOCK_TARGET_LOG").map(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("open MOCK_TARGET_LOG")
    });
    let exit_after: Option<usize> = std::env::var("MOCK_TARGET_EXIT_AFTER")
        .ok()
        .and_then(|v| v.parse().ok());
    let sleep = std::env::var_os("MOCK_TARGET_NO_SLEEP").is_none();

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut handled = 0usize;

    loop {
        let command = match read_command(&mut input) {
            Ok(Some(command)) => command,
            Ok(None) | Err(Error::Io(_)) => break,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        if let Some(log) = log.as_mut() {
            writeln!(log, "{command}").ok();
            log.flush().ok();
        }

        match command {
            Command::Click { x, y } => println!("Click at: {x}, {y}"),
            Command::Wait { milliseconds } => {
                if sleep {
                    thread::sleep(Duration::from_millis(milliseconds.into()));
                }
            }
            Command::Screenshot { path } => match write_placeholder(&path) {
                Ok(()) => println!("Screenshot saved to: {}", path.display()),
                Err(e) => eprintln!("Failed to save screenshot {}: {}", path.display(), e),
            },
            Command::LoadSavegame { path } => println!("Loading savegame: {}", path.display()),
            Command::Exit => {
                println!("Exiting");
                return;
            }
        }

        handled += 1;
        if exit_after.is_some_and(|n| handled >= n) {
            eprintln!("mock_target: simulated crash after {handled} command(s)");
            std::process::exit(3);
        }
    }
}

fn write_placeholder(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, PNG_SIGNATURE)
}
