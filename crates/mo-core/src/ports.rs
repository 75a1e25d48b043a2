//! Ports to the outside world
//!
//! The core never draws or reads keys itself. It reports through a
//! [`DisplayPort`] and pulls player input from a [`CommandSource`].

use std::collections::VecDeque;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Coord, Direction};

bitflags! {
    /// What a disturbance interrupts
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Disturb: u8 {
        /// Stop searching as well as resting
        const SEARCH = 0x01;
        /// Lighting changed around the player
        const LIGHT = 0x02;
    }
}

/// Output side of the user interface
pub trait DisplayPort {
    fn message(&mut self, text: &str);

    fn redraw_cell(&mut self, pos: Coord);

    /// Something happened that should interrupt repeated commands
    fn disturb(&mut self, flags: Disturb);
}

/// A player command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Move(Direction),
    Rest(i32),
    Search,
    Hold,
    GoUp,
    GoDown,
    Quit,
}

/// Input side of the user interface
pub trait CommandSource {
    /// Next command, or `None` when input has ended
    fn next_command(&mut self) -> Option<Command>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("bad argument `{arg}` for `{command}`")]
    BadArgument { command: String, arg: String },
}

impl FromStr for Command {
    type Err = CommandParseError;

    /// Parse `move 6`, `rest 20`, `search`, `hold`, `up`, `down` or `quit`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().ok_or(CommandParseError::Empty)?;
        let arg = words.next();
        let number = |arg: Option<&str>| -> Result<i32, CommandParseError> {
            let arg = arg.unwrap_or_default();
            arg.parse().map_err(|_| CommandParseError::BadArgument {
                command: command.to_string(),
                arg: arg.to_string(),
            })
        };
        match command {
            "move" | "m" => {
                let n = number(arg)?;
                if !(1..=9).contains(&n) || n == 5 {
                    return Err(CommandParseError::BadArgument {
                        command: command.to_string(),
                        arg: n.to_string(),
                    });
                }
                Ok(Command::Move(Direction::from_keypad(n)))
            }
            "rest" | "R" => match arg {
                None | Some("&") => Ok(Command::Rest(-1)),
                Some(_) => number(arg).map(Command::Rest),
            },
            "search" | "s" => Ok(Command::Search),
            "hold" | "," => Ok(Command::Hold),
            "up" | "<" => Ok(Command::GoUp),
            "down" | ">" => Ok(Command::GoDown),
            "quit" | "Q" => Ok(Command::Quit),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

/// Display that records everything it is told
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingDisplay {
    pub messages: Vec<String>,
    pub redraws: Vec<Coord>,
    pub disturbs: Vec<Disturb>,
}

impl RecordingDisplay {
    pub fn contains(&self, text: &str) -> bool {
        self.messages.iter().any(|m| m == text)
    }

    pub fn count(&self, text: &str) -> usize {
        self.messages.iter().filter(|m| *m == text).count()
    }
}

impl DisplayPort for RecordingDisplay {
    fn message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn redraw_cell(&mut self, pos: Coord) {
        self.redraws.push(pos);
    }

    fn disturb(&mut self, flags: Disturb) {
        self.disturbs.push(flags);
    }
}

/// Command source fed from a fixed script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedCommands {
    queue: VecDeque<Command>,
}

impl ScriptedCommands {
    pub fn new(commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            queue: commands.into_iter().collect(),
        }
    }

    /// Parse one command per line; blank lines and `#` comments are skipped
    pub fn parse(script: &str) -> Result<Self, CommandParseError> {
        let commands = script
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::parse)
            .collect::<Result<Vec<Command>, _>>()?;
        Ok(Self::new(commands))
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl CommandSource for ScriptedCommands {
    fn next_command(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("move 6".parse(), Ok(Command::Move(Direction::East)));
        assert_eq!("rest 20".parse(), Ok(Command::Rest(20)));
        assert_eq!("rest".parse(), Ok(Command::Rest(-1)));
        assert_eq!(">".parse(), Ok(Command::GoDown));
        assert!(matches!(
            "move 5".parse::<Command>(),
            Err(CommandParseError::BadArgument { .. })
        ));
        assert!(matches!(
            "dance".parse::<Command>(),
            Err(CommandParseError::Unknown(_))
        ));
    }

    #[test]
    fn test_script_skips_comments() {
        let mut script = ScriptedCommands::parse("# warm up\nsearch\n\nquit\n").unwrap();
        assert_eq!(script.remaining(), 2);
        assert_eq!(script.next_command(), Some(Command::Search));
        assert_eq!(script.next_command(), Some(Command::Quit));
        assert_eq!(script.next_command(), None);
    }
}
