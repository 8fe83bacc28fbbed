//! Read the world once.

use anyhow::{Context, Result};
use dungeon_sync_client::{GameClient, SyncConfig};

use crate::config::NamedAccount;

/// Run the snapshot command.
pub async fn run(config: &SyncConfig, account: &NamedAccount) -> Result<()> {
    let client = GameClient::connect(config).context("Failed to create client")?;
    let snapshot = client.fetch_once(account).await;

    let json = serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?;
    println!("{}", json);
    Ok(())
}
