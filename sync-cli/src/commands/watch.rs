//! Follow the world as it changes.

use anyhow::{Context, Result};
use dungeon_sync_client::{GameClient, SyncConfig};
use dungeon_sync_types::WorldSnapshot;
use tracing::info;

use crate::config::NamedAccount;

/// Run the watch command until `ticks` snapshots were printed or Ctrl-C.
pub async fn run(config: &SyncConfig, account: &NamedAccount, ticks: Option<u64>) -> Result<()> {
    let client = GameClient::connect(config).context("Failed to create client")?;
    let mut snapshots = client.subscribe();
    client.select_account(account).await;
    info!(%account, endpoint = %config.endpoint, "watching");

    let mut printed = 0u64;
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                changed.context("Scheduler stopped unexpectedly")?;
                let latest = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    println!("{}", summary(&snapshot));
                    printed += 1;
                    if ticks.is_some_and(|limit| printed >= limit) {
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    client.shutdown().await;
    Ok(())
}

/// One line per snapshot.
fn summary(snapshot: &WorldSnapshot) -> String {
    let position = snapshot
        .local_position()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    let inventory: Vec<&str> = snapshot
        .local_player
        .inventory
        .iter()
        .map(|item| item.name())
        .collect();

    format!(
        "#{} {} pos={} gold={} inventory=[{}] players={} listings={} map={}",
        snapshot.sequence,
        snapshot.account,
        position,
        snapshot.local_player.gold,
        inventory.join(","),
        snapshot.players.len(),
        snapshot.market.len(),
        if snapshot.map.is_some() { "yes" } else { "no" },
    )
}
