//! CLI command implementations.

pub mod accounts;
pub mod act;
pub mod decode;
pub mod encode;
pub mod snapshot;
pub mod watch;

use clap::Subcommand;
use dungeon_sync_types::{AccountId, Command, ItemCode};

/// A player command as typed on the command line.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ActionArg {
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
    /// Buy an item from another player
    Buy {
        /// Seller's account identifier
        seller: AccountId,
        /// Item: `sword`, `potion`, or a two-digit hex code
        #[arg(value_parser = parse_item)]
        item: ItemCode,
    },
}

impl From<ActionArg> for Command {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::MoveUp => Command::MoveUp,
            ActionArg::MoveDown => Command::MoveDown,
            ActionArg::MoveLeft => Command::MoveLeft,
            ActionArg::MoveRight => Command::MoveRight,
            ActionArg::PickUp => Command::PickUp,
            ActionArg::Drop { slot } => Command::Drop { slot },
            ActionArg::Sell { slot } => Command::Sell { slot },
            ActionArg::Buy { seller, item } => Command::Buy { item, seller },
        }
    }
}

fn parse_item(value: &str) -> Result<ItemCode, String> {
    match value.to_ascii_lowercase().as_str() {
        "sword" => Ok(ItemCode::SWORD),
        "potion" => Ok(ItemCode::POTION),
        hex => ItemCode::from_hex(hex).map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_names_and_codes() {
        assert_eq!(parse_item("sword").unwrap(), ItemCode::SWORD);
        assert_eq!(parse_item("Potion").unwrap(), ItemCode::POTION);
        assert_eq!(parse_item("02").unwrap(), ItemCode::POTION);
        assert!(parse_item("shield").is_err());
    }

    #[test]
    fn buy_maps_seller_and_item() {
        let seller = AccountId::parse("tz1seller").unwrap();
        let command: Command = ActionArg::Buy {
            seller: seller.clone(),
            item: ItemCode::SWORD,
        }
        .into();
        assert_eq!(
            command,
            Command::Buy {
                item: ItemCode::SWORD,
                seller
            }
        );
    }
}
