//! Recover account and command from a payload.

use anyhow::{Context, Result};
use dungeon_sync_types::WirePayload;

/// Run the decode command.
pub fn run(payload: &str) -> Result<()> {
    let (account, command) = WirePayload::from_hex(payload.trim())
        .decode()
        .context("Not a valid operation payload")?;

    println!("account: {}", account);
    println!("command: {} ({})", command, command.code());
    Ok(())
}
