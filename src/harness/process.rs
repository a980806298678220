//! Target process lifecycle
//!
//! Launches the target with piped standard streams, keeps its stdin behind a
//! [`CommandChannel`] and drains stdout/stderr into the log so a chatty target
//! can never block on a full pipe.

use std::collections::BTreeMap;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command as ProcessCommand, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::protocol::Command;

use super::channel::CommandChannel;

/// Everything needed to launch the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLaunch {
    /// Executable path, or a bare name looked up in PATH
    pub program: PathBuf,
    /// Full argument list
    pub args: Vec<String>,
    /// Overrides merged into the inherited environment
    pub env: BTreeMap<String, String>,
}

impl TargetLaunch {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Build the launch from configuration, evaluating the CI indicator now
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: config.target.path.clone(),
            args: config.target.launch_args(),
            env: config.environment.overrides(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Locate the executable
    ///
    /// Paths with a directory part must exist as given; bare names are
    /// searched in PATH.
    pub fn resolve_program(&self) -> Result<PathBuf> {
        let program = &self.program;
        let has_dir = program
            .parent()
            .is_some_and(|parent| !parent.as_os_str().is_empty());

        if has_dir {
            if program.is_file() {
                Ok(program.clone())
            } else {
                Err(Error::launch_failed(
                    program.display(),
                    "executable not found",
                ))
            }
        } else {
            which::which(program).map_err(|e| {
                Error::launch_failed(program.display(), format!("not found in PATH ({e})"))
            })
        }
    }

    /// Shell-like rendering for display
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A live target process
///
/// Owned by exactly one [`Harness`](super::Harness). The only way to write to
/// its stdin is through [`TargetProcess::send`].
pub struct TargetProcess {
    child: Child,
    channel: CommandChannel<ChildStdin>,
    pumps: Vec<JoinHandle<()>>,
    program: PathBuf,
    env: BTreeMap<String, String>,
}

impl TargetProcess {
    /// Launch the target with piped stdin/stdout/stderr
    pub fn spawn(launch: &TargetLaunch) -> Result<Self> {
        let program = launch.resolve_program()?;

        tracing::debug!(
            "Launching {} {:?} with overrides {:?}",
            program.display(),
            launch.args,
            launch.env
        );

        let mut child = ProcessCommand::new(&program)
            .args(&launch.args)
            .envs(&launch.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::launch_failed(program.display(), e.to_string()))?;

        let pid = child.id();

        let streams = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("stdin was not piped"))
            .and_then(|stdin| Ok((stdin, start_pumps(&mut child, pid)?)));

        let (stdin, pumps) = match streams {
            Ok(streams) => streams,
            Err(e) => {
                // Never leave a half-initialized target behind
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::launch_failed(program.display(), e.to_string()));
            }
        };

        Ok(Self {
            child,
            channel: CommandChannel::new(stdin),
            pumps,
            program,
            env: launch.env.clone(),
        })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Resolved executable path
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Environment overrides the process was launched with
    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Number of commands written to the target
    pub fn commands_sent(&self) -> usize {
        self.channel.sent()
    }

    /// Write one command to the target's stdin
    pub fn send(&mut self, command: &Command) -> Result<()> {
        self.channel.send(command)
    }

    /// Check if the process has not exited yet
    pub fn is_running(&mut self) -> bool {
        self.child.try_wait().ok().flatten().is_none()
    }

    /// Ask the target to exit and wait for it
    ///
    /// Sends `exit`, closes stdin and blocks until the process terminates.
    /// There is no timeout and no kill: a target that ignores both the command
    /// and end-of-input keeps this call blocked. A target that already closed
    /// its input (broken pipe) is still waited for normally.
    ///
    /// Output readers still blocked once the target has exited are left
    /// detached: a grandchild may hold the pipes open long after the target
    /// itself is gone. They end on their own at end of output.
    pub fn shutdown(self) -> Result<ExitStatus> {
        let Self {
            mut child,
            mut channel,
            pumps,
            ..
        } = self;

        let sent = channel.send(&Command::Exit);
        drop(channel.into_inner());

        let status = child.wait()?;
        for pump in pumps {
            if pump.is_finished() {
                let _ = pump.join();
            } else {
                tracing::debug!("Target output still held open, leaving its reader detached");
            }
        }

        match sent {
            Err(e) if e.is_broken_pipe() => {
                tracing::debug!("Target closed its input before exit was sent");
            }
            Err(e) => return Err(e),
            Ok(()) => {}
        }

        Ok(status)
    }
}

fn start_pumps(child: &mut Child, pid: u32) -> io::Result<Vec<JoinHandle<()>>> {
    let mut pumps = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        pumps.push(spawn_pump(stdout, "stdout", pid)?);
    }
    if let Some(stderr) = child.stderr.take() {
        pumps.push(spawn_pump(stderr, "stderr", pid)?);
    }
    Ok(pumps)
}

/// Forward a target output stream to the log, one line per event
fn spawn_pump<R>(stream: R, name: &'static str, pid: u32) -> io::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name(format!("target-{name}"))
        .spawn(move || {
            let mut reader = BufReader::new(stream);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        tracing::debug!(pid, stream = name, "{}", line.trim_end());
                    }
                    Err(e) => {
                        tracing::trace!(pid, stream = name, "stopped reading: {}", e);
                        break;
                    }
                }
            }
        })
}
