//! Command channel to the target's standard input
//!
//! Single writer, synchronous flush: commands reach the target in exactly the
//! order `send` was called. Nothing is ever read back.

use std::io::Write;

use crate::common::Result;
use crate::protocol::{write_command, Command};

/// Writes protocol commands to a target input stream
pub struct CommandChannel<W: Write> {
    writer: W,
    sent: usize,
}

impl<W: Write> CommandChannel<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, sent: 0 }
    }

    /// Encode, write and flush one command
    pub fn send(&mut self, command: &Command) -> Result<()> {
        write_command(&mut self.writer, command)?;
        self.sent += 1;
        tracing::debug!(seq = self.sent, "sent: {}", command);
        Ok(())
    }

    /// Number of commands written so far
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Release the underlying stream (dropping it closes the pipe)
    pub fn into_inner(self) -> W {
        self.writer
    }
}
