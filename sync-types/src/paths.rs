//! Key paths of the rollup state tree read by the client.
//!
//! ```text
//! /state/map
//! /players/<account>/{x_pos,y_pos,inventory,gold}
//! /market-place/<seller>/<item>/value
//! ```

use crate::{AccountId, ItemCode};

/// The 1024-byte dungeon map.
pub const MAP: &str = "/state/map";
/// Parent of every player's subtree; its children are account identifiers.
pub const PLAYERS: &str = "/players";
/// Parent of every listing; its children are seller identifiers.
pub const MARKET_PLACE: &str = "/market-place";

/// `/players/<account>`
pub fn player(account: &AccountId) -> String {
    format!("{}/{}", PLAYERS, account)
}

/// `/players/<account>/x_pos`
pub fn player_x(account: &AccountId) -> String {
    format!("{}/x_pos", player(account))
}

/// `/players/<account>/y_pos`
pub fn player_y(account: &AccountId) -> String {
    format!("{}/y_pos", player(account))
}

/// `/players/<account>/inventory`
pub fn player_inventory(account: &AccountId) -> String {
    format!("{}/inventory", player(account))
}

/// `/players/<account>/gold`
pub fn player_gold(account: &AccountId) -> String {
    format!("{}/gold", player(account))
}

/// `/market-place/<seller>`; its children are item keys.
pub fn seller_items(seller: &AccountId) -> String {
    format!("{}/{}", MARKET_PLACE, seller)
}

/// `/market-place/<seller>/<item>/value`
pub fn listing_price(seller: &AccountId, item: ItemCode) -> String {
    format!("{}/{}/value", seller_items(seller), item.to_hex())
}
