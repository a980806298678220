//! Line codec for the target protocol

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::common::{Error, Result};

use super::Command;

/// Encode a command as one protocol line, including the trailing newline
pub fn encode_line(command: &Command) -> Result<String> {
    command.validate()?;
    Ok(format!("{command}\n"))
}

/// Decode one protocol line (with or without its line terminator)
pub fn decode_line(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let verb = parts
        .next()
        .ok_or_else(|| Error::Protocol("Empty command line".to_string()))?;
    let args: Vec<&str> = parts.collect();

    let command = match verb {
        Command::CLICK => {
            let [x, y] = expect_args::<2>(verb, &args)?;
            Command::Click {
                x: parse_int(verb, x)?,
                y: parse_int(verb, y)?,
            }
        }
        Command::WAIT => {
            let [ms] = expect_args::<1>(verb, &args)?;
            Command::Wait {
                milliseconds: parse_int(verb, ms)?,
            }
        }
        Command::SCREENSHOT => {
            let [path] = expect_args::<1>(verb, &args)?;
            Command::Screenshot {
                path: PathBuf::from(path),
            }
        }
        Command::LOAD_SAVEGAME => {
            let [path] = expect_args::<1>(verb, &args)?;
            Command::LoadSavegame {
                path: PathBuf::from(path),
            }
        }
        Command::EXIT => {
            expect_args::<0>(verb, &args)?;
            Command::Exit
        }
        _ => return Err(Error::Protocol(format!("Unknown command: {verb}"))),
    };

    Ok(command)
}

fn expect_args<'a, const N: usize>(verb: &str, args: &[&'a str]) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| {
        Error::Protocol(format!(
            "'{verb}' takes {N} argument(s), got {}",
            args.len()
        ))
    })
}

fn parse_int<T: std::str::FromStr>(verb: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Protocol(format!("Invalid integer '{value}' for '{verb}'")))
}

/// Write a command line and flush it
///
/// Any write or flush failure is reported as a channel error naming the command.
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let line = encode_line(command)?;
    writer
        .write_all(line.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|e| Error::channel_write(command, e))
}

/// Read the next command from a line stream
///
/// Returns `Ok(None)` at end of input. Blank lines are skipped.
pub fn read_command<R: BufRead>(reader: &mut R) -> Result<Option<Command>> {
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.trim().is_empty() {
            continue;
        }
        return decode_line(&line).map(Some);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_line() {
        assert_eq!(
            encode_line(&Command::Click { x: 320, y: 240 }).unwrap(),
            "click 320 240\n"
        );
        assert_eq!(
            encode_line(&Command::Wait { milliseconds: 1000 }).unwrap(),
            "wait 1000\n"
        );
        assert_eq!(encode_line(&Command::Exit).unwrap(), "exit\n");
    }

    #[test]
    fn test_encode_rejects_injected_newline() {
        let err = encode_line(&Command::load_savegame("a.sav\nexit")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_decode_line() {
        assert_eq!(
            decode_line("click 400 300\n").unwrap(),
            Command::Click { x: 400, y: 300 }
        );
        assert_eq!(
            decode_line("  wait   2000  ").unwrap(),
            Command::Wait { milliseconds: 2000 }
        );
        assert_eq!(
            decode_line("screenshot /tmp/s/main_menu.png").unwrap(),
            Command::screenshot("/tmp/s/main_menu.png")
        );
        assert_eq!(
            decode_line("load_savegame saves/a.sav").unwrap(),
            Command::load_savegame("saves/a.sav")
        );
        assert_eq!(decode_line("exit").unwrap(), Command::Exit);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode_line(""), Err(Error::Protocol(_))));
        assert!(matches!(decode_line("jump 1"), Err(Error::Protocol(_))));
        assert!(matches!(decode_line("click 1"), Err(Error::Protocol(_))));
        assert!(matches!(decode_line("click 1 2 3"), Err(Error::Protocol(_))));
        assert!(matches!(decode_line("wait -1"), Err(Error::Protocol(_))));
        assert!(matches!(decode_line("wait soon"), Err(Error::Protocol(_))));
        assert!(matches!(decode_line("exit now"), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_write_command_flushes_each_line() {
        let mut output = Vec::new();
        write_command(&mut output, &Command::Wait { milliseconds: 5 }).unwrap();
        write_command(&mut output, &Command::Exit).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "wait 5\nexit\n");
    }

    #[test]
    fn test_read_command_skips_blank_lines() {
        let mut reader = Cursor::new("\nclick 1 2\n\nexit\n");
        assert_eq!(
            read_command(&mut reader).unwrap(),
            Some(Command::Click { x: 1, y: 2 })
        );
        assert_eq!(read_command(&mut reader).unwrap(), Some(Command::Exit));
        assert_eq!(read_command(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_read_command_resumes_after_bad_line() {
        let mut reader = Cursor::new("jump 1\nwait 10\n");
        assert!(matches!(read_command(&mut reader), Err(Error::Protocol(_))));
        assert_eq!(
            read_command(&mut reader).unwrap(),
            Some(Command::Wait { milliseconds: 10 })
        );
    }
}
