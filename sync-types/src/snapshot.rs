//! Snapshot aggregates published to consumers of the synchronized state.

use serde::{Deserialize, Serialize};

use crate::{AccountId, GameMap, ItemCode, Position};

/// Position of one known player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// The player's account
    pub account: AccountId,
    /// Where the player stands
    pub position: Position,
}

/// Inventory and balance of the signed-in account.
///
/// Only ever fetched for the active account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPlayerState {
    /// Items in slot order; drop and sell address slots by index
    pub inventory: Vec<ItemCode>,
    /// Gold balance
    pub gold: u64,
}

/// One item offered on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketListing {
    /// Account offering the item
    pub seller: AccountId,
    /// The item on offer
    pub item: ItemCode,
    /// Asking price in gold
    pub price: u64,
}

/// Everything synchronized during one tick.
///
/// Immutable once published; the next tick replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Account the snapshot was produced for
    pub account: AccountId,
    /// Polling session that produced it; bumps on every account switch
    pub generation: u64,
    /// Tick number within the session, starting at 1
    pub sequence: u64,
    /// Dungeon map, `None` until a well-formed map has been read
    pub map: Option<GameMap>,
    /// Players with a complete position this tick
    pub players: Vec<PlayerSnapshot>,
    /// The active account's inventory and gold
    pub local_player: LocalPlayerState,
    /// Marketplace listings, rebuilt every tick
    pub market: Vec<MarketListing>,
}

impl WorldSnapshot {
    /// Look up a player by account.
    pub fn player(&self, account: &AccountId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| &p.account == account)
    }

    /// Position of the active account, if it has one yet.
    pub fn local_position(&self) -> Option<Position> {
        self.player(&self.account).map(|p| p.position)
    }

    /// Listings offered by one seller.
    pub fn listings_by<'a>(
        &'a self,
        seller: &'a AccountId,
    ) -> impl Iterator<Item = &'a MarketListing> + 'a {
        self.market.iter().filter(move |l| &l.seller == seller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str) -> AccountId {
        AccountId::parse(id).unwrap()
    }

    fn snapshot() -> WorldSnapshot {
        WorldSnapshot {
            account: account("tz1me"),
            generation: 1,
            sequence: 1,
            map: None,
            players: vec![
                PlayerSnapshot {
                    account: account("tz1me"),
                    position: Position::new(3, 4).unwrap(),
                },
                PlayerSnapshot {
                    account: account("tz1other"),
                    position: Position::new(5, 6).unwrap(),
                },
            ],
            local_player: LocalPlayerState::default(),
            market: vec![
                MarketListing {
                    seller: account("tz1other"),
                    item: ItemCode::SWORD,
                    price: 10,
                },
                MarketListing {
                    seller: account("tz1third"),
                    item: ItemCode::POTION,
                    price: 3,
                },
            ],
        }
    }

    #[test]
    fn local_position_comes_from_players() {
        let snapshot = snapshot();
        assert_eq!(snapshot.local_position(), Position::new(3, 4).ok());
        assert!(snapshot.player(&account("tz1missing")).is_none());
    }

    #[test]
    fn listings_by_seller() {
        let snapshot = snapshot();
        let seller = account("tz1other");
        let listings: Vec<_> = snapshot.listings_by(&seller).collect();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price, 10);
    }

    #[test]
    fn local_player_defaults_to_empty() {
        let local = LocalPlayerState::default();
        assert!(local.inventory.is_empty());
        assert_eq!(local.gold, 0);
    }

    #[test]
    fn snapshot_serializes() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        assert!(json.contains("\"account\":\"tz1me\""));
        assert!(json.contains("\"map\":null"));
    }
}
