//! Snapshot assembly from one tick's raw reads.
//!
//! The client performs every read of a tick and hands the raw results to
//! [`assemble_snapshot`], which decodes them and applies the per-field
//! fallback policy:
//!
//! | Field | Absent | Failed | Malformed |
//! |-------|--------|--------|-----------|
//! | players list | empty | previous | - |
//! | one player's x/y | dropped | dropped | dropped |
//! | inventory, gold | empty / 0 | previous* | previous* |
//! | map | previous | previous | previous |
//! | sellers list | empty | previous | - |
//! | one seller's items | nothing | previous for that seller | - |
//! | one price | omitted | omitted | omitted |
//!
//! *previous only when the previous snapshot belongs to the same account,
//! otherwise the empty default.
//!
//! No single field can abort the tick. Everything that was dropped or
//! retained is reported as a [`FieldIssue`] so the caller can log it.

use std::fmt;

use dungeon_sync_types::{
    AccountId, GameMap, LocalPlayerState, MarketListing, PlayerSnapshot, WorldSnapshot,
};

use crate::decode;

/// Outcome of one read against the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The read succeeded.
    Value(T),
    /// The key does not exist (yet). Not an error.
    Absent,
    /// The read failed or timed out; retried implicitly next tick.
    Failed(String),
}

impl<T> Fetched<T> {
    /// Classify a transport result: `Ok(None)` is absence, `Err` is failure.
    pub fn from_result<E: fmt::Display>(result: Result<Option<T>, E>) -> Self {
        match result {
            Ok(Some(value)) => Fetched::Value(value),
            Ok(None) => Fetched::Absent,
            Err(e) => Fetched::Failed(e.to_string()),
        }
    }
}

/// Raw reads for one account listed under `/players`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerReads {
    /// Child key as listed (the account identifier).
    pub key: String,
    /// Hex text of `x_pos`.
    pub x: Fetched<String>,
    /// Hex text of `y_pos`.
    pub y: Fetched<String>,
}

/// Raw price read for one listed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingReads {
    /// Child key as listed (the item code).
    pub key: String,
    /// Hex text of the price.
    pub price: Fetched<String>,
}

/// Raw reads for one seller listed under `/market-place`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerReads {
    /// Child key as listed (the seller's account identifier).
    pub key: String,
    /// The seller's listed items, if enumeration succeeded.
    pub listings: Fetched<Vec<ListingReads>>,
}

/// Every raw read of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReads {
    /// Account the tick runs for.
    pub account: AccountId,
    /// Polling session of the tick.
    pub generation: u64,
    /// Tick number within the session.
    pub sequence: u64,
    /// Enumeration of `/players` with each player's position reads.
    pub players: Fetched<Vec<PlayerReads>>,
    /// Hex text of the active account's inventory.
    pub inventory: Fetched<String>,
    /// Hex text of the active account's gold.
    pub gold: Fetched<String>,
    /// Hex text of the map.
    pub map: Fetched<String>,
    /// Enumeration of `/market-place` with nested listings.
    pub market: Fetched<Vec<SellerReads>>,
}

/// Something that was dropped or fell back during assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    /// Player enumeration failed; the previous players list was kept.
    PlayersRetained {
        /// Why.
        reason: String,
    },
    /// A player was left out of this tick.
    PlayerDropped {
        /// Child key of the player.
        key: String,
        /// Why.
        reason: String,
    },
    /// Inventory unreadable; previous (or empty) inventory used.
    InventoryRetained {
        /// Why.
        reason: String,
    },
    /// Gold unreadable; previous (or zero) balance used.
    GoldRetained {
        /// Why.
        reason: String,
    },
    /// Map unreadable or malformed; previous map kept.
    MapRetained {
        /// Why.
        reason: String,
    },
    /// Seller enumeration failed; previous listings kept.
    MarketRetained {
        /// Why.
        reason: String,
    },
    /// One seller's items could not be enumerated; their previous listings kept.
    SellerRetained {
        /// Child key of the seller.
        key: String,
        /// Why.
        reason: String,
    },
    /// A seller key is not a valid account; skipped.
    SellerSkipped {
        /// Child key of the seller.
        key: String,
        /// Why.
        reason: String,
    },
    /// A listing was left out of this tick.
    ListingOmitted {
        /// Child key of the seller.
        seller: String,
        /// Child key of the item.
        key: String,
        /// Why.
        reason: String,
    },
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::PlayersRetained { reason } => {
                write!(f, "players list kept from previous tick: {}", reason)
            }
            FieldIssue::PlayerDropped { key, reason } => {
                write!(f, "player {} dropped: {}", key, reason)
            }
            FieldIssue::InventoryRetained { reason } => {
                write!(f, "inventory kept from previous tick: {}", reason)
            }
            FieldIssue::GoldRetained { reason } => {
                write!(f, "gold kept from previous tick: {}", reason)
            }
            FieldIssue::MapRetained { reason } => {
                write!(f, "map kept from previous tick: {}", reason)
            }
            FieldIssue::MarketRetained { reason } => {
                write!(f, "market kept from previous tick: {}", reason)
            }
            FieldIssue::SellerRetained { key, reason } => {
                write!(f, "listings of {} kept from previous tick: {}", key, reason)
            }
            FieldIssue::SellerSkipped { key, reason } => {
                write!(f, "seller {} skipped: {}", key, reason)
            }
            FieldIssue::ListingOmitted {
                seller,
                key,
                reason,
            } => write!(f, "listing {}/{} omitted: {}", seller, key, reason),
        }
    }
}

/// A snapshot plus everything that went wrong building it.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// The assembled snapshot.
    pub snapshot: WorldSnapshot,
    /// Fields that were dropped or fell back.
    pub issues: Vec<FieldIssue>,
}

/// Build the snapshot for one tick.
///
/// `previous` is the last published snapshot, used only for fallbacks.
pub fn assemble_snapshot(reads: TickReads, previous: Option<&WorldSnapshot>) -> Assembly {
    let mut issues = Vec::new();

    let players = assemble_players(reads.players, previous, &mut issues);

    // Inventory and gold belong to one account: never inherit them
    // from a snapshot taken for somebody else.
    let previous_local = previous
        .filter(|p| p.account == reads.account)
        .map(|p| &p.local_player);
    let local_player = assemble_local(reads.inventory, reads.gold, previous_local, &mut issues);

    let map = assemble_map(reads.map, previous, &mut issues);
    let market = assemble_market(reads.market, previous, &mut issues);

    Assembly {
        snapshot: WorldSnapshot {
            account: reads.account,
            generation: reads.generation,
            sequence: reads.sequence,
            map,
            players,
            local_player,
            market,
        },
        issues,
    }
}

fn assemble_players(
    reads: Fetched<Vec<PlayerReads>>,
    previous: Option<&WorldSnapshot>,
    issues: &mut Vec<FieldIssue>,
) -> Vec<PlayerSnapshot> {
    match reads {
        Fetched::Value(players) => players
            .into_iter()
            .filter_map(|player| assemble_player(player, issues))
            .collect(),
        Fetched::Absent => Vec::new(),
        Fetched::Failed(reason) => {
            issues.push(FieldIssue::PlayersRetained { reason });
            previous.map(|p| p.players.clone()).unwrap_or_default()
        }
    }
}

fn assemble_player(reads: PlayerReads, issues: &mut Vec<FieldIssue>) -> Option<PlayerSnapshot> {
    let PlayerReads { key, x, y } = reads;
    let dropped = |key: String, reason: String| FieldIssue::PlayerDropped { key, reason };

    let account = match decode::decode_account_key(&key) {
        Ok(account) => account,
        Err(e) => {
            issues.push(dropped(key, e.to_string()));
            return None;
        }
    };

    // Both halves of the position come from the same tick or not at all.
    let (x, y) = match (x, y) {
        (Fetched::Value(x), Fetched::Value(y)) => (x, y),
        (x, y) => {
            let reason = [missing("x_pos", &x), missing("y_pos", &y)]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(", ");
            issues.push(dropped(key, reason));
            return None;
        }
    };

    match decode::decode_position(&x, &y) {
        Ok(position) => Some(PlayerSnapshot { account, position }),
        Err(e) => {
            issues.push(dropped(key, e.to_string()));
            None
        }
    }
}

fn missing(name: &str, fetched: &Fetched<String>) -> Option<String> {
    match fetched {
        Fetched::Value(_) => None,
        Fetched::Absent => Some(format!("{} absent", name)),
        Fetched::Failed(reason) => Some(format!("{} failed: {}", name, reason)),
    }
}

fn assemble_local(
    inventory: Fetched<String>,
    gold: Fetched<String>,
    previous: Option<&LocalPlayerState>,
    issues: &mut Vec<FieldIssue>,
) -> LocalPlayerState {
    let previous_inventory = || previous.map(|p| p.inventory.clone()).unwrap_or_default();
    let inventory = match inventory {
        Fetched::Value(hex) => match decode::decode_inventory(&hex) {
            Ok(inventory) => inventory,
            Err(e) => {
                issues.push(FieldIssue::InventoryRetained {
                    reason: e.to_string(),
                });
                previous_inventory()
            }
        },
        Fetched::Absent => Vec::new(),
        Fetched::Failed(reason) => {
            issues.push(FieldIssue::InventoryRetained { reason });
            previous_inventory()
        }
    };

    let previous_gold = || previous.map(|p| p.gold).unwrap_or(0);
    let gold = match gold {
        Fetched::Value(hex) => match decode::decode_gold(&hex) {
            Ok(gold) => gold,
            Err(e) => {
                issues.push(FieldIssue::GoldRetained {
                    reason: e.to_string(),
                });
                previous_gold()
            }
        },
        Fetched::Absent => 0,
        Fetched::Failed(reason) => {
            issues.push(FieldIssue::GoldRetained { reason });
            previous_gold()
        }
    };

    LocalPlayerState { inventory, gold }
}

fn assemble_map(
    reads: Fetched<String>,
    previous: Option<&WorldSnapshot>,
    issues: &mut Vec<FieldIssue>,
) -> Option<GameMap> {
    let previous_map = || previous.and_then(|p| p.map.clone());
    match reads {
        Fetched::Value(hex) => match decode::decode_map(&hex) {
            Ok(map) => Some(map),
            Err(e) => {
                issues.push(FieldIssue::MapRetained {
                    reason: e.to_string(),
                });
                previous_map()
            }
        },
        Fetched::Absent => previous_map(),
        Fetched::Failed(reason) => {
            issues.push(FieldIssue::MapRetained { reason });
            previous_map()
        }
    }
}

fn assemble_market(
    reads: Fetched<Vec<SellerReads>>,
    previous: Option<&WorldSnapshot>,
    issues: &mut Vec<FieldIssue>,
) -> Vec<MarketListing> {
    match reads {
        Fetched::Value(sellers) => {
            let mut market = Vec::new();
            for seller in sellers {
                assemble_seller(seller, previous, &mut market, issues);
            }
            market
        }
        Fetched::Absent => Vec::new(),
        Fetched::Failed(reason) => {
            issues.push(FieldIssue::MarketRetained { reason });
            previous.map(|p| p.market.clone()).unwrap_or_default()
        }
    }
}

fn assemble_seller(
    reads: SellerReads,
    previous: Option<&WorldSnapshot>,
    market: &mut Vec<MarketListing>,
    issues: &mut Vec<FieldIssue>,
) {
    let SellerReads { key, listings } = reads;
    let seller = match decode::decode_account_key(&key) {
        Ok(seller) => seller,
        Err(e) => {
            issues.push(FieldIssue::SellerSkipped {
                key,
                reason: e.to_string(),
            });
            return;
        }
    };

    match listings {
        Fetched::Value(listings) => {
            for listing in listings {
                let omitted = |reason: String| FieldIssue::ListingOmitted {
                    seller: key.clone(),
                    key: listing.key.clone(),
                    reason,
                };
                let item = match decode::decode_item_key(&listing.key) {
                    Ok(item) => item,
                    Err(e) => {
                        issues.push(omitted(e.to_string()));
                        continue;
                    }
                };
                let price = match &listing.price {
                    Fetched::Value(hex) => decode::decode_price(hex).map_err(|e| e.to_string()),
                    Fetched::Absent => Err("price absent".to_string()),
                    Fetched::Failed(reason) => Err(format!("price read failed: {}", reason)),
                };
                match price {
                    Ok(price) => market.push(MarketListing {
                        seller: seller.clone(),
                        item,
                        price,
                    }),
                    Err(reason) => issues.push(omitted(reason)),
                }
            }
        }
        Fetched::Absent => {}
        Fetched::Failed(reason) => {
            if let Some(previous) = previous {
                market.extend(previous.listings_by(&seller).cloned());
            }
            issues.push(FieldIssue::SellerRetained { key, reason });
        }
    }
}
