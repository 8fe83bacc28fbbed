//! Submit one command.

use anyhow::{Context, Result};
use dungeon_sync_client::{GameClient, SyncConfig};
use dungeon_sync_types::Command;

use crate::config::NamedAccount;

/// Run the act command.
pub async fn run(config: &SyncConfig, account: &NamedAccount, command: Command) -> Result<()> {
    let client = GameClient::connect(config).context("Failed to create client")?;
    let payload = client
        .send_as(account, command.clone())
        .await
        .with_context(|| format!("Failed to submit {}", command))?;

    println!("Submitted {} for {}", command, account);
    println!("  payload: {}", payload);
    Ok(())
}
