//! Player commands understood by the dungeon kernel.
//!
//! A command code is a two-hex-digit verb followed by fixed-width hex
//! arguments:
//!
//! | Verb | Command | Arguments |
//! |------|---------|-----------|
//! | `01` | move up | none |
//! | `02` | move down | none |
//! | `03` | move left | none |
//! | `04` | move right | none |
//! | `05` | pick up | none |
//! | `06` | drop slot | slot byte |
//! | `07` | sell slot | slot byte |
//! | `08` | buy | item byte, then the seller's account identifier |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec;
use crate::{AccountId, FormatError, ItemCode};

/// Verb discriminator of a command code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Verb {
    /// Move one tile up
    MoveUp = 0x01,
    /// Move one tile down
    MoveDown = 0x02,
    /// Move one tile left
    MoveLeft = 0x03,
    /// Move one tile right
    MoveRight = 0x04,
    /// Pick up the item on the current tile
    PickUp = 0x05,
    /// Drop an inventory slot onto the current tile
    Drop = 0x06,
    /// List an inventory slot on the marketplace
    Sell = 0x07,
    /// Buy a listed item
    Buy = 0x08,
}

impl TryFrom<u8> for Verb {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Verb::MoveUp),
            0x02 => Ok(Verb::MoveDown),
            0x03 => Ok(Verb::MoveLeft),
            0x04 => Ok(Verb::MoveRight),
            0x05 => Ok(Verb::PickUp),
            0x06 => Ok(Verb::Drop),
            0x07 => Ok(Verb::Sell),
            0x08 => Ok(Verb::Buy),
            _ => Err(FormatError::UnknownVerb(codec::pad2(value))),
        }
    }
}

/// A typed player command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Move one tile up
    MoveUp,
    /// Move one tile down
    MoveDown,
    /// Move one tile left
    MoveLeft,
    /// Move one tile right
    MoveRight,
    /// Pick up the item on the current tile
    PickUp,
    /// Drop the item in an inventory slot
    Drop {
        /// Inventory slot index
        slot: u8,
    },
    /// Put the item in an inventory slot up for sale
    Sell {
        /// Inventory slot index
        slot: u8,
    },
    /// Buy an item listed by another player
    Buy {
        /// The listed item
        item: ItemCode,
        /// Account that listed the item
        seller: AccountId,
    },
}

impl Command {
    /// The verb of this command.
    pub fn verb(&self) -> Verb {
        match self {
            Command::MoveUp => Verb::MoveUp,
            Command::MoveDown => Verb::MoveDown,
            Command::MoveLeft => Verb::MoveLeft,
            Command::MoveRight => Verb::MoveRight,
            Command::PickUp => Verb::PickUp,
            Command::Drop { .. } => Verb::Drop,
            Command::Sell { .. } => Verb::Sell,
            Command::Buy { .. } => Verb::Buy,
        }
    }

    /// Render the fixed-width command code, e.g. `"0603"` for dropping slot 3.
    pub fn code(&self) -> String {
        let verb = codec::pad2(self.verb() as u8);
        match self {
            Command::Drop { slot } | Command::Sell { slot } => {
                format!("{}{}", verb, codec::pad2(*slot))
            }
            // The seller is not length-prefixed: it runs to the end of the
            // payload, so it must stay the last argument.
            Command::Buy { item, seller } => format!("{}{}{}", verb, item.to_hex(), seller),
            _ => verb,
        }
    }

    /// Parse a command code the way the inbox does.
    pub fn parse(code: &str) -> Result<Self, FormatError> {
        if !code.is_ascii() || code.len() < 2 {
            return Err(FormatError::MalformedCommand(code.to_string()));
        }
        let verb = Verb::try_from(codec::decode_byte(&code[..2])?)?;
        let args = &code[2..];

        let no_args = |command: Command| {
            if args.is_empty() {
                Ok(command)
            } else {
                Err(FormatError::MalformedCommand(code.to_string()))
            }
        };
        let slot = || {
            if args.len() != 2 {
                return Err(FormatError::MalformedCommand(code.to_string()));
            }
            codec::decode_byte(args)
        };

        match verb {
            Verb::MoveUp => no_args(Command::MoveUp),
            Verb::MoveDown => no_args(Command::MoveDown),
            Verb::MoveLeft => no_args(Command::MoveLeft),
            Verb::MoveRight => no_args(Command::MoveRight),
            Verb::PickUp => no_args(Command::PickUp),
            Verb::Drop => Ok(Command::Drop { slot: slot()? }),
            Verb::Sell => Ok(Command::Sell { slot: slot()? }),
            Verb::Buy => {
                if args.len() < 3 {
                    return Err(FormatError::MalformedCommand(code.to_string()));
                }
                let item = ItemCode::from_hex(&args[..2])?;
                let seller = AccountId::parse(&args[2..])?;
                Ok(Command::Buy { item, seller })
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::MoveUp => f.write_str("move up"),
            Command::MoveDown => f.write_str("move down"),
            Command::MoveLeft => f.write_str("move left"),
            Command::MoveRight => f.write_str("move right"),
            Command::PickUp => f.write_str("pick up"),
            Command::Drop { slot } => write!(f, "drop slot {}", slot),
            Command::Sell { slot } => write!(f, "sell slot {}", slot),
            Command::Buy { item, seller } => write!(f, "buy {} from {}", item, seller),
        }
    }
}
