//! Decoding rules for each fragment of the world state.
//!
//! Every stored value arrives as hex text. These functions turn one
//! fragment into its typed form or fail with a [`FormatError`]; they never
//! decide what to do about the failure (see [`crate::assemble`]).

use dungeon_sync_types::codec;
use dungeon_sync_types::{AccountId, FormatError, GameMap, ItemCode, Position};

/// Decode a player's position from its `x_pos` and `y_pos` values.
pub fn decode_position(x_hex: &str, y_hex: &str) -> Result<Position, FormatError> {
    let x = codec::decode_uint(x_hex)?;
    let y = codec::decode_uint(y_hex)?;
    Position::new(x, y)
}

/// Decode an inventory: one item byte per slot, order preserved.
pub fn decode_inventory(hex: &str) -> Result<Vec<ItemCode>, FormatError> {
    codec::split_byte_pairs(hex)?
        .into_iter()
        .map(ItemCode::from_hex)
        .collect()
}

/// Decode a gold balance.
pub fn decode_gold(hex: &str) -> Result<u64, FormatError> {
    codec::decode_uint(hex)
}

/// Decode the map value into exactly 1024 tiles.
pub fn decode_map(hex: &str) -> Result<GameMap, FormatError> {
    GameMap::from_hex(hex)
}

/// Decode a listing price.
pub fn decode_price(hex: &str) -> Result<u64, FormatError> {
    codec::decode_uint(hex)
}

/// Interpret a child key of `/players` or `/market-place` as an account.
pub fn decode_account_key(key: &str) -> Result<AccountId, FormatError> {
    AccountId::parse(key)
}

/// Interpret a child key of `/market-place/<seller>` as an item.
pub fn decode_item_key(key: &str) -> Result<ItemCode, FormatError> {
    ItemCode::from_hex(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_sync_types::{TileCode, MAP_TILES};

    #[test]
    fn position_from_single_bytes() {
        let pos = decode_position("05", "1f").unwrap();
        assert_eq!((pos.x(), pos.y()), (5, 31));
    }

    #[test]
    fn position_from_usize_values() {
        let pos = decode_position("0000000000000010", "0000000000000010").unwrap();
        assert_eq!((pos.x(), pos.y()), (16, 16));
    }

    #[test]
    fn position_off_map_is_rejected() {
        assert!(matches!(
            decode_position("20", "00"),
            Err(FormatError::OutOfRange { .. })
        ));
        assert!(decode_position("zz", "00").is_err());
    }

    #[test]
    fn inventory_keeps_slot_order() {
        let inventory = decode_inventory("020102").unwrap();
        assert_eq!(
            inventory,
            vec![ItemCode::POTION, ItemCode::SWORD, ItemCode::POTION]
        );
        assert!(decode_inventory("").unwrap().is_empty());
    }

    #[test]
    fn inventory_odd_length_fails() {
        assert!(matches!(
            decode_inventory("010"),
            Err(FormatError::OddLength(3))
        ));
    }

    #[test]
    fn gold_and_price() {
        assert_eq!(decode_gold("00000000000003e8").unwrap(), 1000);
        assert_eq!(decode_price("0a").unwrap(), 10);
        assert!(decode_gold("").is_err());
    }

    #[test]
    fn map_requires_exactly_1024_tiles() {
        let full = "03".repeat(MAP_TILES);
        let map = decode_map(&full).unwrap();
        assert!(map.tiles().iter().all(|t| *t == TileCode::Empty));

        let short = "03".repeat(MAP_TILES - 1);
        assert!(matches!(
            decode_map(&short),
            Err(FormatError::MapLength(1023))
        ));
    }

    #[test]
    fn keys() {
        assert_eq!(decode_item_key("01").unwrap(), ItemCode::SWORD);
        assert!(decode_item_key("sword").is_err());
        assert!(decode_account_key("tz1abc").is_ok());
        assert!(decode_account_key("").is_err());
    }
}
