//! Commands accepted on stdin while `roomwatch run` is active.

use std::str::FromStr;

use thiserror::Error;

use roomwatch_types::{ParseError, Quantity, RoomId};

/// Usage text for the interactive prompt.
pub const HELP: &str = "\
Commands:
  room <id>                 switch to a room and refresh it
  refresh                   run a tick now
  set <field>=<value> ...   save thresholds for the current room
                            (temp_min temp_max humidity_min humidity_max
                             co2_max voc_max lux_min)
  history <quantity>        show the current room's history
                            (temperature humidity co2 voc lux)
  alerts                    show active alerts
  rooms                     list rooms
  help                      show this text
  quit                      exit
";

/// One interactive command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Room(RoomId),
    Refresh,
    Set(Vec<(String, String)>),
    History(Quantity),
    Alerts,
    Rooms,
    Help,
    Quit,
}

/// Errors from parsing an interactive command line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0} (type 'help' for a list)")]
    Unknown(String),
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("Expected <field>=<value>, got {0:?}")]
    InvalidAssignment(String),
    #[error(transparent)]
    Quantity(#[from] ParseError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Empty);
        };

        match name.to_lowercase().as_str() {
            "room" | "r" => words
                .next()
                .map(|id| Command::Room(RoomId::from(id)))
                .ok_or(CommandError::MissingArgument("room id")),
            "refresh" => Ok(Command::Refresh),
            "set" => {
                let pairs = words
                    .map(|word| {
                        word.split_once('=')
                            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
                            .map(|(k, v)| (k.to_string(), v.to_string()))
                            .ok_or_else(|| CommandError::InvalidAssignment(word.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if pairs.is_empty() {
                    return Err(CommandError::MissingArgument("<field>=<value>"));
                }
                Ok(Command::Set(pairs))
            }
            "history" => {
                let quantity = words
                    .next()
                    .ok_or(CommandError::MissingArgument("quantity"))?;
                Ok(Command::History(quantity.parse()?))
            }
            "alerts" => Ok(Command::Alerts),
            "rooms" => Ok(Command::Rooms),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
