//! Target command protocol
//!
//! Line-oriented text over the target's standard input, one command per line,
//! verb first and arguments separated by single spaces:
//!
//! ```text
//! click <x> <y>
//! wait <milliseconds>
//! screenshot <absolute_path>
//! load_savegame <path>
//! exit
//! ```
//!
//! The protocol is one-directional. The target never acknowledges a command.

mod codec;
mod command;

pub use codec::{decode_line, encode_line, read_command, write_command};
pub use command::Command;
