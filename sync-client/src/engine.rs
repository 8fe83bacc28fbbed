//! WorldSyncEngine - one snapshot per tick.
//!
//! A tick issues the fixed set of reads concurrently:
//!
//! ```text
//! /players ──► /players/<id>/x_pos, /players/<id>/y_pos   (per player)
//! /players/<me>/inventory, /players/<me>/gold
//! /state/map
//! /market-place ──► /market-place/<seller> ──► .../<item>/value
//! ```
//!
//! and hands the raw results to [`assemble_snapshot`], which applies the
//! per-field fallbacks. The engine itself never fails a tick.

use futures_util::future::join_all;
use tracing::{debug, warn};

use dungeon_sync_core::{
    assemble_snapshot, Assembly, FieldIssue, Fetched, ListingReads, PlayerReads, SellerReads,
    TickReads,
};
use dungeon_sync_types::{paths, AccountId, ItemCode, WorldSnapshot};

use crate::state::StateClient;
use crate::transport::StateTransport;

/// Produces world snapshots from the remote state tree.
#[derive(Debug, Clone)]
pub struct WorldSyncEngine<T: StateTransport> {
    state: StateClient<T>,
}

impl<T: StateTransport> WorldSyncEngine<T> {
    /// Create an engine reading through `state`.
    pub fn new(state: StateClient<T>) -> Self {
        Self { state }
    }

    /// Run one tick for `account`.
    ///
    /// `previous` is the last published snapshot; fields that cannot be read
    /// this tick fall back to it.
    pub async fn tick(
        &self,
        account: &AccountId,
        previous: Option<&WorldSnapshot>,
        generation: u64,
        sequence: u64,
    ) -> WorldSnapshot {
        debug!(%account, generation, sequence, "tick started");

        let (players, inventory, gold, map, market) = tokio::join!(
            self.read_players(),
            self.read_value(paths::player_inventory(account)),
            self.read_value(paths::player_gold(account)),
            self.read_value(paths::MAP.to_string()),
            self.read_market(),
        );

        let reads = TickReads {
            account: account.clone(),
            generation,
            sequence,
            players,
            inventory,
            gold,
            map,
            market,
        };
        let Assembly { snapshot, issues } = assemble_snapshot(reads, previous);

        for issue in &issues {
            match issue {
                // Expected while a listing is bought between enumeration and price read.
                FieldIssue::ListingOmitted { .. } => debug!(%account, %issue, "field skipped"),
                _ => warn!(%account, %issue, "field skipped"),
            }
        }
        debug!(
            %account,
            generation,
            sequence,
            players = snapshot.players.len(),
            listings = snapshot.market.len(),
            has_map = snapshot.map.is_some(),
            issues = issues.len(),
            "tick finished"
        );

        snapshot
    }

    async fn read_value(&self, path: String) -> Fetched<String> {
        Fetched::from_result(self.state.read_value(&path).await)
    }

    async fn read_players(&self) -> Fetched<Vec<PlayerReads>> {
        let keys = match self.state.read_children(paths::PLAYERS).await {
            Ok(keys) => keys,
            Err(e) => return Fetched::Failed(e.to_string()),
        };
        Fetched::Value(join_all(keys.into_iter().map(|key| self.read_player(key))).await)
    }

    async fn read_player(&self, key: String) -> PlayerReads {
        // Keys that are not usable as path segments are reported by the assembler.
        let Ok(account) = AccountId::parse(&key) else {
            return PlayerReads {
                key,
                x: Fetched::Absent,
                y: Fetched::Absent,
            };
        };
        let (x, y) = tokio::join!(
            self.read_value(paths::player_x(&account)),
            self.read_value(paths::player_y(&account)),
        );
        PlayerReads { key, x, y }
    }

    async fn read_market(&self) -> Fetched<Vec<SellerReads>> {
        let sellers = match self.state.read_children(paths::MARKET_PLACE).await {
            Ok(sellers) => sellers,
            Err(e) => return Fetched::Failed(e.to_string()),
        };
        Fetched::Value(join_all(sellers.into_iter().map(|key| self.read_seller(key))).await)
    }

    async fn read_seller(&self, key: String) -> SellerReads {
        let Ok(seller) = AccountId::parse(&key) else {
            return SellerReads {
                key,
                listings: Fetched::Absent,
            };
        };
        let items = match self.state.read_children(&paths::seller_items(&seller)).await {
            Ok(items) => items,
            Err(e) => {
                return SellerReads {
                    key,
                    listings: Fetched::Failed(e.to_string()),
                }
            }
        };

        let seller = &seller;
        let listings = join_all(items.into_iter().map(|item_key| async move {
            let price = match ItemCode::from_hex(&item_key) {
                Ok(item) => self.read_value(paths::listing_price(seller, item)).await,
                Err(_) => Fetched::Absent,
            };
            ListingReads {
                key: item_key,
                price,
            }
        }))
        .await;

        SellerReads {
            key,
            listings: Fetched::Value(listings),
        }
    }
}
